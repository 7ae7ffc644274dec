pub mod chats;
pub mod customers;
pub mod documents;
pub mod expenses;
pub mod objects;
pub mod rates;
