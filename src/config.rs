use crate::error::{
    BadEnvVarSnafu, ParseMaxConnectionsSnafu, ParsePortSnafu, StudentsResult,
    UnknownStorageBackendSnafu,
};
use secrecy::{ExposeSecret, SecretString};
use snafu::ResultExt;
use std::{env::VarError, sync::Arc};

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 15;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_ip: String,
    storage: StorageConfig,
}

#[derive(Clone, Debug)]
pub enum StorageConfig {
    Postgres(Arc<DbConfig>),
    Memory,
}

impl RuntimeConfiguration {
    pub fn new() -> StudentsResult<Self> {
        Self::from_lookup(dotenvy::var)
    }

    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> StudentsResult<Self> {
        let server_ip = optional_var(&lookup, "STUDENTS_SERVER_IP")?
            .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());

        let storage = match optional_var(&lookup, "STUDENTS_STORAGE")?.as_deref() {
            None | Some("postgres") => {
                StorageConfig::Postgres(Arc::new(DbConfig::from_lookup(&lookup)?))
            }
            Some("memory") => StorageConfig::Memory,
            Some(found) => {
                return UnknownStorageBackendSnafu { found }.fail();
            }
        };

        Ok(Self { server_ip, storage })
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    pub const fn storage(&self) -> &StorageConfig {
        &self.storage
    }
}

fn optional_var(
    lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    name: &'static str,
) -> StudentsResult<Option<String>> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}

#[derive(Debug)]
pub struct DbConfig {
    user: String,
    password: SecretString,
    path: String,
    port: u16,
    database: String,
    max_connections: u32,
}

impl DbConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> StudentsResult<Self> {
        let get_env_var = |name| lookup(name).context(BadEnvVarSnafu { name });

        let max_connections = match optional_var(lookup, "DB_MAX_CONNECTIONS")? {
            Some(max) => max.parse().context(ParseMaxConnectionsSnafu)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            user: get_env_var("DB_USER")?,
            password: SecretString::from(get_env_var("DB_PASSWORD")?),
            path: get_env_var("DB_PATH")?,
            port: get_env_var("DB_PORT")?.parse().context(ParsePortSnafu)?,
            database: get_env_var("DB_NAME")?,
            max_connections,
        })
    }

    pub fn get_db_path(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.path,
            self.port,
            self.database
        )
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
