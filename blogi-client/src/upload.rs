use reqwest::header::CONTENT_TYPE;

use crate::error::{ClientError, ClientResult};
use crate::http_client::HttpClient;

/// MIME-тип, с которым файл пишется в хранилище.
///
/// Хранилище подписывает URL именно под этот Content-Type, поэтому
/// PUT обязан отправить его же независимо от реального типа файла.
const UPLOAD_CONTENT_TYPE: &str = "image/jpg";

impl HttpClient {
    /// Пишет байты файла напрямую в хранилище по presigned URL.
    ///
    /// Без повторов, без контрольных сумм, без докачки: неуспешный
    /// статус — это ошибка с кодом ответа в сообщении.
    pub async fn upload_to_presigned_url(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<()> {
        tracing::debug!(%upload_url, size = bytes.len(), "uploading file to presigned url");

        let response = self
            .inner()
            .put(upload_url)
            .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
            .body(bytes)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upload(format!(
                "Failed to upload file. Status: {}",
                status.as_u16()
            )));
        }

        Ok(())
    }

    /// Полная последовательность загрузки обложки: запрос presigned URL,
    /// затем прямой PUT файла. Возвращает итоговый публичный URL.
    pub async fn upload_image(
        &self,
        token: &str,
        file_name: &str,
        file_type: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<String> {
        let presigned = self.presigned_url(token, file_name, file_type).await?;
        self.upload_to_presigned_url(&presigned.upload_url, bytes)
            .await?;
        Ok(presigned.file_url)
    }
}
