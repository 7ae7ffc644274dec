pub mod chats;
pub mod customers;
pub mod documents;
pub mod expenses;
pub mod objects;
pub mod rates;
pub mod telegram;
pub mod zones;
