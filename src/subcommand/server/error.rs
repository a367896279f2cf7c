use super::*;

#[derive(Debug)]
pub(super) enum ServerError {
  Fatal(BridgeError),
  Internal(Error),
}

pub(super) type ServerResult<T = Response> = Result<T, ServerError>;

impl IntoResponse for ServerError {
  fn into_response(self) -> Response {
    match self {
      Self::Fatal(err) => fatal(&err),
      Self::Internal(error) => {
        log::warn!("error serving request: {error:#}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({
            "error": "internal error",
            "result": null,
          })),
        )
          .into_response()
      }
    }
  }
}

impl From<Error> for ServerError {
  fn from(error: Error) -> Self {
    match error.downcast::<BridgeError>() {
      Ok(err) => err.into(),
      Err(error) => Self::Internal(error),
    }
  }
}

impl From<BridgeError> for ServerError {
  fn from(err: BridgeError) -> Self {
    if err.is_fatal() {
      Self::Fatal(err)
    } else {
      Self::Internal(err.into())
    }
  }
}

impl From<JsonRejection> for ServerError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Internal(anyhow!(rejection.body_text()))
  }
}

impl From<QueryRejection> for ServerError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Internal(anyhow!(rejection.body_text()))
  }
}
