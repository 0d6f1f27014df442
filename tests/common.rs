use std::collections::HashMap;

use httpmock::MockServer;

use api_pressure_engine::{ApiDefinition, RequestResult};

/// Build a GET definition pointing at a path on the mock server.
#[allow(dead_code)]
pub fn get(server: &MockServer, path: &str) -> ApiDefinition {
    ApiDefinition::new("GET", server.url(path)).unwrap()
}

/// Build a definition with an explicit method pointing at the mock server.
#[allow(dead_code)]
pub fn api(server: &MockServer, method: &str, path: &str) -> ApiDefinition {
    ApiDefinition::new(method, server.url(path)).unwrap()
}

/// Group results by virtual user, keeping the order in which they were returned.
#[allow(dead_code)]
pub fn by_user(results: &[RequestResult]) -> HashMap<usize, Vec<&RequestResult>> {
    let mut users: HashMap<usize, Vec<&RequestResult>> = HashMap::new();
    for result in results {
        users.entry(result.user_id).or_default().push(result);
    }
    users
}
