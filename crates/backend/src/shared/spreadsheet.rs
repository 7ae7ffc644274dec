use calamine::{Reader, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Unsupported file extension \"{0}\". Use .csv or .xlsx.")]
    UnsupportedFormat(String),

    #[error("Failed to parse spreadsheet: {0}")]
    Parse(String),
}

/// Разбор загруженного файла в список строк «заголовок -> строковое значение».
/// Формат выбирается по расширению; пустые строки листа пропускаются.
pub fn parse_spreadsheet(
    bytes: &[u8],
    file_name: &str,
) -> Result<Vec<HashMap<String, String>>, SpreadsheetError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => parse_csv(bytes),
        "xlsx" => parse_xlsx(bytes),
        _ => Err(SpreadsheetError::UnsupportedFormat(extension)),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<HashMap<String, String>>, SpreadsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SpreadsheetError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| SpreadsheetError::Parse(e.to_string()))?;
        let mut row_map = HashMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<HashMap<String, String>>, SpreadsheetError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| SpreadsheetError::Parse(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet_names.first() {
        Some(name) => name.clone(),
        None => return Ok(Vec::new()),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SpreadsheetError::Parse(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = match rows.next() {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };

    // Ячейки приводятся к отображаемой строке: числа без хвостового `.0`,
    // даты и прочие типы через их общее строковое представление.
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row_map = HashMap::new();

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), cell.to_string().trim().to_string());
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

/// CSV-выгрузка для шаблона импорта и экспорта документов.
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // csv::Writer ошибается только на несериализуемых данных; здесь их нет.
    let _ = writer.write_record(headers);
    for row in rows {
        let _ = writer.write_record(row);
    }
    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_are_keyed_by_trimmed_headers() {
        let data = "username , phoneNumber\njohn.smith,+998901112233\n";
        let records = parse_spreadsheet(data.as_bytes(), "import.csv").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("username"), Some(&"john.smith".to_string()));
        assert_eq!(
            records[0].get("phoneNumber"),
            Some(&"+998901112233".to_string())
        );
    }

    #[test]
    fn blank_csv_rows_are_skipped() {
        let data = "username,age\njohn.smith,28\n,\nanna.k,30\n";
        let records = parse_spreadsheet(data.as_bytes(), "import.csv").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = parse_spreadsheet(b"data", "import.ods");
        assert!(matches!(
            result,
            Err(SpreadsheetError::UnsupportedFormat(ext)) if ext == "ods"
        ));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let data = "username\njohn.smith\n";
        let records = parse_spreadsheet(data.as_bytes(), "IMPORT.CSV").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn csv_writer_quotes_values_with_commas() {
        let out = write_csv(
            &["name", "positions"],
            &[vec!["Корпус A".to_string(), "Пост 1,Пост 2".to_string()]],
        );
        assert!(out.contains("\"Пост 1,Пост 2\""));
        assert!(out.starts_with("name,positions"));
    }
}
