//! Connection provider: typed operations on top of the session transport
//!
//! Each operation builds a parameter map, sends it through a
//! [`BiostoreConnector`] and classifies the answer. A response whose `type`
//! is not `ok` always becomes [`BiostoreError::AccessDenied`]; an `ok`
//! response lacking a required field becomes [`BiostoreError::ProtocolContract`].
//! Every failure is logged exactly once, here, before it is returned.

use crate::envelope::ResponseEnvelope;
use crate::transport::{parameters, BiostoreConnector, HttpConnector, Parameters};
use biostore_core::protocol::{action, attr};
use biostore_core::{
    BiostoreConfig, BiostoreError, BiostoreResult, ConnectionConfig, ErrorContext, LoginRecord,
    Permission, Project, ProjectRecord, ProjectUser, ProjectUserRecord, ProtocolVersion, Token,
    UserPermissions,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

const COMPONENT: &str = "connection_provider";

pub const TOKENS_NOT_SUPPORTED: &str = "Specified server does not support json web tokens.";

#[derive(Debug, Deserialize)]
struct TokenPayload {
    jwtoken: Option<String>,
}

/// Client for the store's permission actions
#[derive(Clone)]
pub struct ConnectionProvider {
    connector: Arc<dyn BiostoreConnector>,
    protocol: ProtocolVersion,
}

impl ConnectionProvider {
    /// Connect over HTTP using `config`
    pub fn new(config: &ConnectionConfig) -> BiostoreResult<Self> {
        let connector = HttpConnector::new(config)?;
        Ok(Self::with_connector(Arc::new(connector), config.protocol))
    }

    /// Connect using the `connection` section of a loaded configuration
    pub fn from_config(config: &BiostoreConfig) -> BiostoreResult<Self> {
        Self::new(&config.connection)
    }

    pub fn with_connector(connector: Arc<dyn BiostoreConnector>, protocol: ProtocolVersion) -> Self {
        info!(%protocol, "Created biostore connection provider");
        Self {
            connector,
            protocol,
        }
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Log in with a password and fetch the user's permissions.
    ///
    /// A `name$other` username logs in as `name` acting for `other`.
    pub async fn authorize(
        &self,
        username: &str,
        password: &str,
        remote_address: Option<&str>,
    ) -> BiostoreResult<UserPermissions> {
        const OPERATION: &str = "authorizing";
        let mut params = login_parameters(username, password);
        if let Some(ip) = remote_address {
            params.insert(attr::IP.to_string(), ip.to_string());
        }

        let envelope = self
            .ask(OPERATION, Some(username), action::LOGIN, &params)
            .await?;
        let login: LoginRecord = self.payload(&envelope, OPERATION, Some(username))?;
        let permissions = UserPermissions::from_login(username, &login)
            .map_err(|e| report(e.in_operation(OPERATION, Some(username))))?;

        debug!(
            username,
            grants = permissions.grants().len(),
            admin = permissions.is_admin(),
            "Authorized user"
        );
        Ok(permissions)
    }

    /// Log in with a password and obtain a bearer token
    pub async fn issue_token(&self, username: &str, password: &str) -> BiostoreResult<Token> {
        const OPERATION: &str = "issuing token for";
        let params = login_parameters(username, password);
        let envelope = self
            .ask(OPERATION, Some(username), action::LOGIN, &params)
            .await?;
        self.token_from(&envelope, Some(username), OPERATION)
    }

    /// Exchange `token` for a fresh one for the same user
    pub async fn refresh_token(&self, token: &Token) -> BiostoreResult<Token> {
        const OPERATION: &str = "refreshing token for";
        let params = self.token_parameters(token, OPERATION, [])?;
        let envelope = self
            .ask(OPERATION, token.username(), action::REFRESH_JW_TOKEN, &params)
            .await?;
        self.token_from(&envelope, token.username(), OPERATION)
    }

    pub async fn logout(&self, token: &Token) -> BiostoreResult<()> {
        const OPERATION: &str = "logging out";
        let params = self.token_parameters(token, OPERATION, [])?;
        self.ask(OPERATION, token.username(), action::LOGOUT, &params)
            .await?;
        Ok(())
    }

    /// Projects visible to the token's user, in the order the store lists them
    pub async fn project_list(&self, token: &Token) -> BiostoreResult<Vec<Project>> {
        const OPERATION: &str = "listing projects for";
        let params = self.token_parameters(token, OPERATION, [])?;
        let envelope = self
            .ask(
                OPERATION,
                token.username(),
                self.protocol.spec().project_list_action,
                &params,
            )
            .await?;
        self.projects(&envelope, token.username(), OPERATION)
    }

    /// Same as [`ConnectionProvider::project_list`], authenticating with a password
    pub async fn project_list_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> BiostoreResult<Vec<Project>> {
        const OPERATION: &str = "listing projects for";
        let params = login_parameters(username, password);
        let envelope = self
            .ask(
                OPERATION,
                Some(username),
                self.protocol.spec().project_list_action,
                &params,
            )
            .await?;
        self.projects(&envelope, Some(username), OPERATION)
    }

    pub async fn create_project_with_permissions(
        &self,
        token: &Token,
        project_name: &str,
        permission: Permission,
    ) -> BiostoreResult<()> {
        const OPERATION: &str = "creating project for";
        let bits = permission.wire_value().to_string();
        let params = self.token_parameters(
            token,
            OPERATION,
            [(attr::PROJECT_NAME, project_name), (attr::PERMISSION, bits.as_str())],
        )?;
        self.ask(OPERATION, token.username(), action::CREATE_PROJECT, &params)
            .await?;
        Ok(())
    }

    pub async fn add_user_to_project(
        &self,
        token: &Token,
        user_to_add: &str,
        project_name: &str,
    ) -> BiostoreResult<()> {
        const OPERATION: &str = "adding project member for";
        let params = self.token_parameters(
            token,
            OPERATION,
            [(attr::PROJECT_NAME, project_name), (attr::USER, user_to_add)],
        )?;
        self.ask(OPERATION, token.username(), action::ADD_TO_PROJECT, &params)
            .await?;
        Ok(())
    }

    pub async fn change_user_role_in_project(
        &self,
        token: &Token,
        project_name: &str,
        user_to_change: &str,
        new_role: &str,
    ) -> BiostoreResult<()> {
        const OPERATION: &str = "changing project role for";
        let params = self.token_parameters(
            token,
            OPERATION,
            [
                (attr::USER, user_to_change),
                (attr::PROJECT_NAME, project_name),
                (attr::ROLE, new_role),
            ],
        )?;
        self.ask(
            OPERATION,
            token.username(),
            action::CHANGE_ROLE_IN_PROJECT,
            &params,
        )
        .await?;
        Ok(())
    }

    /// Members of `project_name`, sorted by user then role
    pub async fn project_users(
        &self,
        token: &Token,
        project_name: &str,
    ) -> BiostoreResult<Vec<ProjectUser>> {
        const OPERATION: &str = "listing project members for";
        let params = self.token_parameters(token, OPERATION, [(attr::PROJECT_NAME, project_name)])?;
        let envelope = self
            .ask(OPERATION, token.username(), action::PROJECT_USERS, &params)
            .await?;

        let mut users: Vec<ProjectUser> = self
            .records(&envelope, attr::PROJECT_USERS, token.username(), OPERATION)?
            .iter()
            .filter_map(|value| ProjectUserRecord::deserialize(value).ok())
            .filter_map(|record| ProjectUser::from_record(&record))
            .collect();
        users.sort();
        Ok(users)
    }

    /// Send one action and classify the answer
    async fn ask(
        &self,
        operation: &str,
        username: Option<&str>,
        action: &str,
        params: &Parameters,
    ) -> BiostoreResult<ResponseEnvelope> {
        let envelope = self
            .connector
            .exchange(username, action, params)
            .await
            .map_err(|e| report(e.in_operation(operation, username)))?;

        match envelope.failure_message() {
            None => Ok(envelope),
            Some(message) => Err(report(BiostoreError::access_denied(
                message,
                envelope.status().as_reported().map(str::to_string),
                context(operation, username).with_metadata("action", action),
            ))),
        }
    }

    fn payload<T: serde::de::DeserializeOwned>(
        &self,
        envelope: &ResponseEnvelope,
        operation: &str,
        username: Option<&str>,
    ) -> BiostoreResult<T> {
        envelope.payload().map_err(|e| {
            report(BiostoreError::protocol_contract(
                format!("Malformed response payload: {}", e),
                None,
                context(operation, username),
            ))
        })
    }

    fn token_from(
        &self,
        envelope: &ResponseEnvelope,
        username: Option<&str>,
        operation: &str,
    ) -> BiostoreResult<Token> {
        let payload: TokenPayload = self.payload(envelope, operation, username)?;
        match payload.jwtoken {
            Some(value) => Ok(Token::from_parts(username.map(str::to_string), Some(value))),
            None => Err(report(BiostoreError::protocol_contract(
                TOKENS_NOT_SUPPORTED,
                Some(attr::JWTOKEN),
                context(operation, username),
            ))),
        }
    }

    /// Array stored under `field`; required whenever the store reports success
    fn records<'e>(
        &self,
        envelope: &'e ResponseEnvelope,
        field: &str,
        username: Option<&str>,
        operation: &str,
    ) -> BiostoreResult<&'e [Value]> {
        envelope
            .field(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                report(BiostoreError::protocol_contract(
                    format!("Response has no '{}' list", field),
                    Some(field),
                    context(operation, username),
                ))
            })
    }

    fn projects(
        &self,
        envelope: &ResponseEnvelope,
        username: Option<&str>,
        operation: &str,
    ) -> BiostoreResult<Vec<Project>> {
        let field = self.protocol.spec().project_list_field;
        Ok(self
            .records(envelope, field, username, operation)?
            .iter()
            .filter_map(|value| ProjectRecord::deserialize(value).ok())
            .filter_map(|record| Project::from_record(&record))
            .collect())
    }

    /// `jwtoken` plus `extra`; a token without a credential never reaches the store
    fn token_parameters<const N: usize>(
        &self,
        token: &Token,
        operation: &str,
        extra: [(&str, &str); N],
    ) -> BiostoreResult<Parameters> {
        let value = token.value().ok_or_else(|| {
            report(
                BiostoreError::invalid_argument(
                    "Token has no credential",
                    Some(attr::JWTOKEN),
                    COMPONENT,
                )
                .in_operation(operation, token.username()),
            )
        })?;

        let mut params = parameters(extra);
        params.insert(attr::JWTOKEN.to_string(), value.to_string());
        Ok(params)
    }
}

/// `username`, `password`, and `sudo` when the name has a `$`-separated suffix
fn login_parameters(username: &str, password: &str) -> Parameters {
    let mut fields = username.split('$');
    let login = fields.next().unwrap_or_default();
    let mut params = parameters([(attr::USERNAME, login), (attr::PASSWORD, password)]);
    if let Some(sudo) = fields.next().filter(|sudo| !sudo.is_empty()) {
        params.insert(attr::SUDO.to_string(), sudo.to_string());
    }
    params
}

fn context(operation: &str, username: Option<&str>) -> ErrorContext {
    ErrorContext::new(COMPONENT)
        .with_operation(operation)
        .with_metadata("username", username.unwrap_or(""))
}

fn report(error: BiostoreError) -> BiostoreError {
    error.log();
    error
}
