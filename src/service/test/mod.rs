use serde_json::json;
use test_utils::{builder::TestBuilder, error::TestError, factory::config::ConfigFactory};
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::{
    config::Config,
    data::token::TokenRepository,
    error::{twitch::TwitchError, AppError},
    service::twitch::{StreamStatusProvider, TwitchClient, TwitchEndpoints, API_TOKEN_NAME},
};
