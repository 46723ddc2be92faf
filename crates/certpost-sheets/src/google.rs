//! Google Sheets v4 REST client with service-account auth.
//!
//! Auth is a self-signed RS256 JWT exchanged at the token endpoint for a
//! bearer token (cached until shortly before expiry). The spreadsheet is
//! addressed by ID when configured, otherwise resolved once by name through
//! the Drive v3 files query. Reads hit the first sheet; writes are
//! single-cell RAW updates.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use serde_json::Value;
use tokio::sync::Mutex;

use certpost_core::config::{GoogleAuthConfig, SheetConfig};
use certpost_core::error::{CertpostError, Result};
use certpost_core::traits::SheetStore;
use certpost_core::types::RawRow;

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES: &str = "https://www.googleapis.com/drive/v3/files";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";
/// Widest range we ever read; sheets in practice have a handful of columns.
const GRID_COLUMNS: &str = "ZZ";

struct ServiceToken {
    value: String,
    expires_at: i64,
}

/// Google Sheets implementation of the source table gateway.
pub struct GoogleSheetStore {
    auth: GoogleAuthConfig,
    sheet: SheetConfig,
    client: reqwest::Client,
    token: Mutex<Option<ServiceToken>>,
    resolved_id: Mutex<Option<String>>,
}

impl GoogleSheetStore {
    pub fn new(auth: GoogleAuthConfig, sheet: SheetConfig) -> Self {
        Self {
            auth,
            sheet,
            client: reqwest::Client::new(),
            token: Mutex::new(None),
            resolved_id: Mutex::new(None),
        }
    }

    /// Build the signed service-account JWT (`header.claims.signature`).
    fn build_jwt(&self, now: i64) -> Result<String> {
        let header =
            URL_SAFE_NO_PAD.encode(serde_json::json!({"alg": "RS256", "typ": "JWT"}).to_string());
        let claims = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "iss": self.auth.client_email,
                "scope": SCOPES,
                "aud": self.auth.token_uri,
                "iat": now,
                "exp": now + 3600,
            })
            .to_string(),
        );
        let signing_input = format!("{header}.{claims}");

        let key = RsaPrivateKey::from_pkcs8_pem(&self.auth.private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&self.auth.private_key_pem))
            .map_err(|e| CertpostError::Config(format!("Invalid service-account key: {e}")))?;
        let signature = SigningKey::<Sha256>::new(key).sign(signing_input.as_bytes());

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }

    /// Get a bearer token, reusing the cached one until 60s before expiry.
    async fn access_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        {
            let cached = self.token.lock().await;
            if let Some(t) = cached.as_ref()
                && t.expires_at - 60 > now
            {
                return Ok(t.value.clone());
            }
        }

        let assertion = self.build_jwt(now)?;
        let resp = self
            .client
            .post(&self.auth.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CertpostError::Sheet(format!(
                "Token exchange failed ({status}): {body}"
            )));
        }

        let body: Value = resp.json().await?;
        let value = body["access_token"]
            .as_str()
            .ok_or_else(|| CertpostError::Sheet("Token response missing access_token".into()))?
            .to_string();
        let expires_in = body["expires_in"].as_i64().unwrap_or(3600);

        *self.token.lock().await = Some(ServiceToken {
            value: value.clone(),
            expires_at: now + expires_in,
        });
        Ok(value)
    }

    /// The spreadsheet ID — configured directly, or looked up by name once.
    async fn spreadsheet_id(&self) -> Result<String> {
        if let Some(id) = &self.sheet.spreadsheet_id {
            return Ok(id.clone());
        }
        if let Some(id) = self.resolved_id.lock().await.clone() {
            return Ok(id);
        }

        let token = self.access_token().await?;
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            self.sheet.spreadsheet_name.replace('\'', "\\'")
        );
        let resp = self
            .client
            .get(DRIVE_FILES)
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(CertpostError::Sheet(format!(
                "Drive lookup for '{}' failed ({status})",
                self.sheet.spreadsheet_name
            )));
        }

        let body: Value = resp.json().await?;
        let id = body["files"][0]["id"]
            .as_str()
            .ok_or_else(|| {
                CertpostError::Sheet(format!(
                    "Spreadsheet '{}' not found",
                    self.sheet.spreadsheet_name
                ))
            })?
            .to_string();
        tracing::info!("📄 Resolved spreadsheet '{}' → {id}", self.sheet.spreadsheet_name);

        *self.resolved_id.lock().await = Some(id.clone());
        Ok(id)
    }

    /// Fetch a value range from the first sheet, raw cells untouched.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let id = self.spreadsheet_id().await?;
        let token = self.access_token().await?;
        let url = format!("{SHEETS_BASE}/{id}/values/{range}");
        let resp = self.client.get(&url).bearer_auth(&token).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(CertpostError::Sheet(format!(
                "Reading range {range} failed ({status})"
            )));
        }

        let body: Value = resp.json().await?;
        let rows = body["values"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|row| row.as_array().cloned().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}

#[async_trait]
impl SheetStore for GoogleSheetStore {
    async fn read_header(&self) -> Result<Vec<String>> {
        let mut rows = self.read_range(&format!("A1:{GRID_COLUMNS}1")).await?;
        let header = rows.drain(..).next().unwrap_or_default();
        Ok(header
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect())
    }

    async fn read_all_rows(&self) -> Result<Vec<RawRow>> {
        let rows = self.read_range(&format!("A2:{GRID_COLUMNS}")).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow {
                row: i + 2,
                cells: cells.into_iter().map(numericise).collect(),
            })
            .collect())
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let id = self.spreadsheet_id().await?;
        let token = self.access_token().await?;
        let range = format!("{}{row}", column_letter(col));
        let url = format!("{SHEETS_BASE}/{id}/values/{range}?valueInputOption=RAW");
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            return Err(CertpostError::Sheet(format!(
                "Writing cell {range} failed ({status})"
            )));
        }
        Ok(())
    }
}

/// Convert numeric-looking string cells into numbers, so day-fraction times
/// survive the formatted-value API (gspread does the same on read).
fn numericise(cell: Value) -> Value {
    if let Value::String(s) = &cell {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::from(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::from(f);
        }
    }
    cell
}

/// 1-based column number to A1 letters (1 → A, 27 → AA).
fn column_letter(mut col: usize) -> String {
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(7), "G");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_numericise() {
        assert_eq!(numericise(Value::from("0.625")), Value::from(0.625));
        assert_eq!(numericise(Value::from("15")), Value::from(15));
        assert_eq!(numericise(Value::from("15:00")), Value::from("15:00"));
        assert_eq!(numericise(Value::from("06/10/2024")), Value::from("06/10/2024"));
        assert_eq!(numericise(Value::from("Asha")), Value::from("Asha"));
    }

    #[test]
    fn test_build_jwt_claims() {
        use rand::rngs::OsRng;
        use rsa::pkcs8::EncodePrivateKey;

        let key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let pem = key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF).unwrap();

        let store = GoogleSheetStore::new(
            certpost_core::config::GoogleAuthConfig {
                client_email: "svc@project.iam.gserviceaccount.com".into(),
                private_key_pem: pem.to_string(),
                token_uri: "https://oauth2.googleapis.com/token".into(),
            },
            certpost_core::config::SheetConfig {
                spreadsheet_id: Some("abc123".into()),
                spreadsheet_name: String::new(),
            },
        );

        let jwt = store.build_jwt(1_700_000_000).unwrap();
        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let claims: Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["iss"], "svc@project.iam.gserviceaccount.com");
        assert_eq!(claims["aud"], "https://oauth2.googleapis.com/token");
        assert_eq!(claims["exp"], 1_700_003_600_i64);
        assert!(claims["scope"].as_str().unwrap().contains("spreadsheets"));
        assert!(!parts[2].is_empty());
    }
}
