//! Google Sheets v4 gateway

use crate::auth::SheetSession;
use crate::error::{AppError, Result};
use crate::sheets::types::*;
use crate::sheets::SheetGateway;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Spreadsheet opened through the Sheets REST API
pub struct GoogleSheets {
    client: Client,
    session: SheetSession,
    spreadsheet_id: String,
}

impl GoogleSheets {
    /// Open a spreadsheet by its id
    pub fn new(client: Client, session: SheetSession, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client,
            session,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Open the spreadsheet whose title is `title`, as shared with the
    /// service account
    pub async fn open_by_title(client: Client, session: SheetSession, title: &str) -> Result<Self> {
        let url = drive_search_url(title)?;
        tracing::debug!("Looking up spreadsheet '{}'", title);

        let response = client
            .get(url)
            .header("Authorization", session.bearer())
            .send()
            .await?;
        let response = check_response(response).await?;

        #[derive(Deserialize)]
        struct FileList {
            #[serde(default)]
            files: Vec<DriveFile>,
        }

        #[derive(Deserialize)]
        struct DriveFile {
            id: String,
            name: String,
        }

        let list: FileList = response.json().await?;
        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Spreadsheet '{}'", title)))?;

        tracing::info!("Opened spreadsheet '{}' ({})", file.name, file.id);

        Ok(Self::new(client, session, file.id))
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            BASE_URL,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn get_values(&self, range: &str, major_dimension: &str) -> Result<ValueRange> {
        tracing::debug!("GET values {} ({})", range, major_dimension);

        let response = self
            .client
            .get(self.values_url(range))
            .header("Authorization", self.session.bearer())
            .query(&[("majorDimension", major_dimension)])
            .send()
            .await?;

        let response = check_response(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SheetGateway for GoogleSheets {
    fn id(&self) -> &'static str {
        "google"
    }

    async fn read_all_rows(&self, table: Table) -> Result<Vec<Row>> {
        let range = self.get_values(table.worksheet(), "ROWS").await?;
        Ok(range.values)
    }

    async fn read_column(&self, table: Table, column: usize) -> Result<Vec<String>> {
        let range = self.get_values(&column_range(table, column)?, "COLUMNS").await?;
        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    async fn read_header(&self, table: Table) -> Result<Row> {
        let range = self
            .get_values(&format!("{}!1:1", table.worksheet()), "ROWS")
            .await?;
        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, table: Table, values: &[i64]) -> Result<()> {
        let url = format!("{}:append", self.values_url(table.worksheet()));

        let response = self
            .client
            .post(url)
            .header("Authorization", self.session.bearer())
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&AppendRequest::single_row(values))
            .send()
            .await?;

        let response = check_response(response).await?;
        let result: AppendResponse = response.json().await?;

        let updated = result
            .updates
            .and_then(|u| u.updated_range)
            .unwrap_or_else(|| table.worksheet().to_string());
        tracing::debug!("Appended {:?} at {}", values, updated);

        Ok(())
    }
}

/// Turn a non-success response into a spreadsheet error
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Sheets(describe_api_error(status.as_u16(), &body)))
}

fn describe_api_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(e) => {
            let code = e.error.code.unwrap_or(status);
            match e.error.status {
                Some(kind) => format!("{} {}: {}", code, kind, e.error.message),
                None => format!("{}: {}", code, e.error.message),
            }
        }
        Err(_) => format!("Sheets API returned {}", status),
    }
}

/// A1 letters for a 1-based column number
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn column_range(table: Table, column: usize) -> Result<String> {
    if column == 0 {
        return Err(AppError::Sheets("Column numbers start at 1".to_string()));
    }
    let letter = column_letter(column);
    Ok(format!("{}!{}:{}", table.worksheet(), letter, letter))
}

fn drive_search_url(title: &str) -> Result<Url> {
    let query = format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        title.replace('\\', "\\\\").replace('\'', "\\'"),
        SPREADSHEET_MIME
    );

    Url::parse_with_params(
        DRIVE_FILES_URL,
        &[("q", query.as_str()), ("fields", "files(id,name)"), ("pageSize", "1")],
    )
    .map_err(|e| AppError::Config(format!("Invalid Drive URL: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sheets() -> GoogleSheets {
        let session = SheetSession::from_token("t", "stall@example.com", Utc::now());
        GoogleSheets::new(Client::new(), session, "sheet-123")
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(53), "BA");
    }

    #[test]
    fn test_column_range() {
        assert_eq!(column_range(Table::Sales, 3).unwrap(), "sales!C:C");
        assert!(column_range(Table::Sales, 0).is_err());
    }

    #[test]
    fn test_values_url_encodes_range() {
        assert_eq!(
            sheets().values_url("stock!1:1"),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/stock%211%3A1"
        );
    }

    #[test]
    fn test_drive_query_escapes_quotes() {
        let url = drive_search_url("bob's sheet").unwrap();
        let q = url
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(q.starts_with("name = 'bob\\'s sheet'"));
        assert!(q.contains(SPREADSHEET_MIME));
    }

    #[test]
    fn test_api_error_description() {
        let body = r#"{"error":{"code":403,
            "message":"The caller does not have permission",
            "status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            describe_api_error(403, body),
            "403 PERMISSION_DENIED: The caller does not have permission"
        );
        assert_eq!(describe_api_error(500, ""), "Sheets API returned 500");
    }
}
