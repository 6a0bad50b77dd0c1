use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Client-side screens the application can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    SignIn,
    SignUp,
    Explore,
    AllUsers,
    Saved,
    CreatePost,
    Profile(String),
}

impl Screen {
    pub fn path(&self) -> String {
        match self {
            Screen::Home => "/".into(),
            Screen::SignIn => "/sign-in".into(),
            Screen::SignUp => "/sign-up".into(),
            Screen::Explore => "/explore".into(),
            Screen::AllUsers => "/all-users".into(),
            Screen::Saved => "/saved".into(),
            Screen::CreatePost => "/create-post".into(),
            Screen::Profile(id) => format!("/profile/{id}"),
        }
    }
}

impl Serialize for Screen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
}

impl Toast {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

/// What the form should do after a submit: show a toast, navigate, reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmitOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigate: Option<Screen>,
    pub reset_form: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: FieldErrors,
}

impl SubmitOutcome {
    pub fn toast(title: &str) -> Self {
        Self {
            toast: Some(Toast::new(title)),
            ..Default::default()
        }
    }

    pub fn invalid(field_errors: FieldErrors) -> Self {
        Self {
            field_errors,
            ..Default::default()
        }
    }

    /// Form cleared and user sent to `screen`.
    pub fn done(screen: Screen) -> Self {
        Self {
            navigate: Some(screen),
            reset_form: true,
            ..Default::default()
        }
    }

    pub fn navigate(screen: Screen) -> Self {
        Self {
            navigate: Some(screen),
            ..Default::default()
        }
    }

    pub fn then_navigate(mut self, screen: Screen) -> Self {
        self.navigate = Some(screen);
        self
    }

    pub fn is_invalid(&self) -> bool {
        !self.field_errors.is_empty()
    }
}
