use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use super::{RouteParams, RouteTable};
use crate::error::ViewLoadError;

/// ViewId
///
/// Stable identifier of every screen the portal can show. Route entries point
/// at a `ViewId`; the registry turns it into something renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ViewId {
    Login,
    SignUp,
    ResetPassword,
    ForgotPassword,
    Home,
    PostList,
    PostDetail,
    AddProperty,
    MyProperties,
    EditProperty,
    Profile,
    ProfileSettings,
    NotFound,
}

impl ViewId {
    pub const ALL: [ViewId; 13] = [
        ViewId::Login,
        ViewId::SignUp,
        ViewId::ResetPassword,
        ViewId::ForgotPassword,
        ViewId::Home,
        ViewId::PostList,
        ViewId::PostDetail,
        ViewId::AddProperty,
        ViewId::MyProperties,
        ViewId::EditProperty,
        ViewId::Profile,
        ViewId::ProfileSettings,
        ViewId::NotFound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Login => "login",
            ViewId::SignUp => "sign-up",
            ViewId::ResetPassword => "reset-password",
            ViewId::ForgotPassword => "forgot-password",
            ViewId::Home => "home",
            ViewId::PostList => "post-list",
            ViewId::PostDetail => "post-detail",
            ViewId::AddProperty => "add-property",
            ViewId::MyProperties => "my-properties",
            ViewId::EditProperty => "edit-property",
            ViewId::Profile => "profile",
            ViewId::ProfileSettings => "profile-settings",
            ViewId::NotFound => "not-found",
        }
    }
}

/// Builds a view from the props a route hands it.
pub type ViewFactory<V> = Arc<dyn Fn(&RouteParams) -> Result<V, ViewLoadError> + Send + Sync>;

/// ViewRegistry
///
/// Lookup table from `ViewId` to a factory. Replaces per-route loader closures:
/// every view a route table references must be registered up front.
pub struct ViewRegistry<V> {
    factories: HashMap<ViewId, ViewFactory<V>>,
}

impl<V> Default for ViewRegistry<V> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<V> ViewRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, view: ViewId, factory: F) -> Self
    where
        F: Fn(&RouteParams) -> Result<V, ViewLoadError> + Send + Sync + 'static,
    {
        self.factories.insert(view, Arc::new(factory));
        self
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.factories.contains_key(&view)
    }

    pub fn load(&self, view: ViewId, props: &RouteParams) -> Result<V, ViewLoadError> {
        let factory = self
            .factories
            .get(&view)
            .ok_or(ViewLoadError::Unregistered(view))?;
        factory(props)
    }

    /// Views referenced by `table` that have no factory, in table order.
    pub fn missing_for(&self, table: &RouteTable) -> Vec<ViewId> {
        let mut missing = Vec::new();
        for record in table.records() {
            if !self.contains(record.component) && !missing.contains(&record.component) {
                missing.push(record.component);
            }
        }
        missing
    }
}

/// ViewDescriptor
///
/// What the portal registry hands the front end: which bundle chunk to mount
/// and with which props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewDescriptor {
    pub view: ViewId,
    pub title: String,
    /// Bundle chunk the client imports to render this view.
    pub chunk: String,
    /// `false` for views shipped in the entry bundle.
    pub lazy: bool,
    #[schema(value_type = Object)]
    pub props: RouteParams,
}

impl ViewRegistry<ViewDescriptor> {
    /// portal
    ///
    /// Registry covering every view of the property portal. Post detail and
    /// the not-found page ship in the entry bundle, the rest load on demand.
    pub fn portal() -> Self {
        let entries: [(ViewId, &'static str, &'static str, bool); 13] = [
            (ViewId::Login, "Log in", "views/auth/Login", true),
            (ViewId::SignUp, "Sign up", "views/auth/SignUp", true),
            (ViewId::ResetPassword, "Reset password", "views/auth/ResetPassword", true),
            (ViewId::ForgotPassword, "Forgot password", "views/auth/ForgotPassword", true),
            (ViewId::Home, "Home", "views/HomeView", true),
            (ViewId::PostList, "Listings", "views/posts/PostList", true),
            (ViewId::PostDetail, "Listing", "views/posts/PostDetail", false),
            (ViewId::AddProperty, "Add property", "views/posts/AddProperty", true),
            (ViewId::MyProperties, "My properties", "views/posts/MyProperties", true),
            (ViewId::EditProperty, "Edit property", "views/posts/EditProperty", true),
            (ViewId::Profile, "Profile", "views/user/Profile", true),
            (ViewId::ProfileSettings, "Settings", "views/user/ProfileSettings", true),
            (ViewId::NotFound, "Page not found", "views/NotFound", false),
        ];

        entries
            .into_iter()
            .fold(Self::new(), |registry, (view, title, chunk, lazy)| {
                registry.register(view, move |props| {
                    Ok(ViewDescriptor {
                        view,
                        title: title.to_string(),
                        chunk: chunk.to_string(),
                        lazy,
                        props: props.clone(),
                    })
                })
            })
    }
}
