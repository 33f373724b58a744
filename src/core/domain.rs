use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by backend records
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
}


// Configuration abstracts deployment options for a checkout desk
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub(crate) struct Configuration {
    pub service_point_id: String,
    pub okapi_url: String,
    pub tenant: String,
    pub token: Option<String>,
    pub item_chunk_size: usize,
    pub patron_lookup_limit: usize,
    pub request_timeout_secs: u64,
}

impl Configuration {
    pub fn new(service_point_id: &str) -> Self {
        Configuration {
            service_point_id: service_point_id.to_string(),
            okapi_url: "http://localhost:9130".to_string(),
            tenant: "diku".to_string(),
            token: None,
            item_chunk_size: 100,
            patron_lookup_limit: 100,
            request_timeout_secs: 30,
        }
    }

    pub fn with_okapi(mut self, okapi_url: &str, tenant: &str, token: Option<String>) -> Self {
        self.okapi_url = okapi_url.trim_end_matches('/').to_string();
        self.tenant = tenant.to_string();
        self.token = token;
        self
    }

    pub fn with_item_chunk_size(mut self, item_chunk_size: usize) -> Self {
        self.item_chunk_size = item_chunk_size.max(1);
        self
    }
}
