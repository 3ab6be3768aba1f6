//! Shared identifier newtypes and future aliases for the palaver workspace.
//!
//! ```rust
//! use pcommon::{SessionId, TurnId, UserId};
//!
//! let session = SessionId::from("session-1");
//! let turn = TurnId::new("turn-1");
//! let user = UserId::new("user-1");
//!
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(turn.to_string(), "turn-1");
//! assert_eq!(user.as_str(), "user-1");
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod ids {
    //! Cross-crate identifier newtypes.
    //!
    //! ```rust
    //! use pcommon::{SessionId, UserId};
    //!
    //! let session = SessionId::new("session-42");
    //! let user = UserId::from("user-42");
    //!
    //! assert_eq!(session.to_string(), "session-42");
    //! assert_eq!(user.as_str(), "user-42");
    //! ```

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct SessionId(String);

    impl SessionId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct UserId(String);

    impl UserId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for UserId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for UserId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for UserId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct TurnId(String);

    impl TurnId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for TurnId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for TurnId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for TurnId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub use future::BoxFuture;
pub use ids::{SessionId, TurnId, UserId};
