//! Scripted in-memory backend for unit tests

use async_trait::async_trait;
use std::cell::{Cell, RefCell};

use crate::api::{
    Attachment, ChatBackend, HistoryPage, Interaction, InteractionId, LoginResponse,
    QueryResponse, UserProfile,
};
use crate::error::{ClientError, ClientResult};

/// Every call the fake received, in order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Register(String),
    Login(String),
    TextQuery(String),
    ImageQuery { query: String, file_name: String },
    Feedback { id: String, is_good: bool },
    History(HistoryPage),
    Profile,
    UpdatePrompt(String),
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub(crate) calls: RefCell<Vec<Call>>,
    pub(crate) next_id: Cell<i64>,
    pub reply: Option<String>,
    pub history: Vec<Interaction>,
    pub fail_register: bool,
    pub fail_login: bool,
    pub fail_queries: bool,
    pub fail_feedback: bool,
}

impl FakeBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn server_error() -> ClientError {
        ClientError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        }
    }

    fn answer(&self) -> ClientResult<QueryResponse> {
        if self.fail_queries {
            return Err(Self::server_error());
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        Ok(QueryResponse {
            id: InteractionId::new(id.to_string()),
            ai_response: self.reply.clone(),
        })
    }
}

#[async_trait(?Send)]
impl ChatBackend for FakeBackend {
    async fn register(&self, email: &str, _password: &str) -> ClientResult<()> {
        self.record(Call::Register(email.to_string()));
        if self.fail_register {
            return Err(ClientError::Api {
                status: 400,
                message: "Email already registered".to_string(),
            });
        }
        Ok(())
    }

    async fn login(&self, email: &str, _password: &str) -> ClientResult<LoginResponse> {
        self.record(Call::Login(email.to_string()));
        if self.fail_login {
            return Err(ClientError::Api {
                status: 401,
                message: "Incorrect email or password".to_string(),
            });
        }
        Ok(LoginResponse {
            access_token: "test-token".to_string(),
            token_type: Some("bearer".to_string()),
        })
    }

    async fn text_query(&self, query: &str) -> ClientResult<QueryResponse> {
        self.record(Call::TextQuery(query.to_string()));
        self.answer()
    }

    async fn image_query(&self, query: &str, image: &Attachment) -> ClientResult<QueryResponse> {
        self.record(Call::ImageQuery {
            query: query.to_string(),
            file_name: image.file_name.clone(),
        });
        self.answer()
    }

    async fn submit_feedback(&self, interaction_id: &InteractionId, is_good: bool) -> ClientResult<()> {
        self.record(Call::Feedback {
            id: interaction_id.to_string(),
            is_good,
        });
        if self.fail_feedback {
            return Err(Self::server_error());
        }
        Ok(())
    }

    async fn history(&self, page: HistoryPage) -> ClientResult<Vec<Interaction>> {
        self.record(Call::History(page));
        if self.fail_queries {
            return Err(Self::server_error());
        }
        Ok(self.history.clone())
    }

    async fn profile(&self) -> ClientResult<UserProfile> {
        self.record(Call::Profile);
        Ok(UserProfile {
            id: 1,
            email: "maya@example.com".to_string(),
            is_active: true,
            system_prompt: "You are SuperMaya.".to_string(),
        })
    }

    async fn update_system_prompt(&self, prompt: &str) -> ClientResult<UserProfile> {
        self.record(Call::UpdatePrompt(prompt.to_string()));
        Ok(UserProfile {
            id: 1,
            email: "maya@example.com".to_string(),
            is_active: true,
            system_prompt: prompt.to_string(),
        })
    }
}
