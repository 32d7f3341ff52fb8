use crate::{
    config::ApiConfig,
    data::student::{ApiErrorBody, Student, StudentFields, StudentId, StudentUpdate},
    error::{
        BuildClientSnafu, DecodeResponseSnafu, MalformedRejectionSnafu, RejectedSnafu,
        RosterResult, TransportSnafu,
    },
    store::RecordStore,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;

#[derive(Clone, Debug)]
pub struct HttpRecordStore {
    client: Client,
    collection_url: String,
    token: Option<SecretString>,
}

impl HttpRecordStore {
    pub fn new(config: &ApiConfig) -> RosterResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context(BuildClientSnafu)?;

        Ok(Self {
            client,
            collection_url: config.collection_url.clone(),
            token: config.token.clone(),
        })
    }

    async fn send(&self, request: RequestBuilder) -> RosterResult<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await.context(TransportSnafu)?;
        ensure_success(response).await
    }
}

/// Turns a non-2xx response into an error without assuming the body holds anything useful.
async fn ensure_success(response: Response) -> RosterResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let bytes = response.bytes().await.context(TransportSnafu)?;
    match serde_json::from_slice::<ApiErrorBody>(&bytes) {
        Ok(body) => {
            warn!(%status, message = %body.message, "Student service rejected request");
            RejectedSnafu { status, body }.fail()
        }
        Err(e) => {
            warn!(%status, ?e, "Student service rejected request with unreadable body");
            MalformedRejectionSnafu { status }.fail()
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list(&self) -> RosterResult<Vec<Student>> {
        debug!(url = %self.collection_url, "Listing students");
        self.send(self.client.get(&self.collection_url))
            .await?
            .json()
            .await
            .context(DecodeResponseSnafu)
    }

    async fn create(&self, fields: StudentFields) -> RosterResult<()> {
        debug!(name = %fields.name, "Creating student");
        self.send(self.client.post(&self.collection_url).json(&fields))
            .await
            .map(|_| ())
    }

    async fn update(&self, update: StudentUpdate) -> RosterResult<()> {
        debug!(id = %update.id, "Updating student");
        self.send(self.client.put(&self.collection_url).json(&update))
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: StudentId) -> RosterResult<()> {
        debug!(%id, "Deleting student");
        let url = format!("{}/{}", self.collection_url, id);
        self.send(self.client.delete(url)).await.map(|_| ())
    }
}
