//! Throwaway MongoDB for repository tests.

use mongodb::{Client, Database};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

/// A MongoDB container plus a connected client. The container is removed on drop.
pub struct TestMongo {
    _container: ContainerAsync<Mongo>,
    pub client: Client,
    pub connection_string: String,
}

impl TestMongo {
    pub async fn new() -> Self {
        let container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get host port");

        let connection_string = format!("mongodb://127.0.0.1:{host_port}");
        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to connect to test MongoDB");

        tracing::info!(port = host_port, "test MongoDB ready");

        Self {
            _container: container,
            client,
            connection_string,
        }
    }

    /// A database handle; use a per-test name to keep tests independent.
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }
}
