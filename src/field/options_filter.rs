use crate::filter_object::FilterObject;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::rc::Rc;

/// Extra constraints sent along with an options request
pub type FilterParams = Map<String, Value>;

/// Who the dashboard is currently being viewed as
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewContext {
    /// Viewing as oneself rather than impersonating another user
    pub myself: bool,
    /// Roles of the signed-in user
    pub user_roles: Vec<String>,
    /// Roles of the user being viewed as
    pub view_as_roles: Vec<String>,
    /// Employee key of the user being viewed as, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_as: Option<String>,
}

impl ViewContext {
    /// Roles in effect for the current view
    pub fn roles(&self) -> &[String] {
        if self.myself {
            &self.user_roles
        } else {
            &self.view_as_roles
        }
    }
}

/// Runtime inputs available when an options filter is resolved
pub struct ResolveContext<'a> {
    pub pane_filters: &'a FilterObject,
    pub view: &'a ViewContext,
}

type DynamicParams = dyn Fn(&ResolveContext<'_>) -> FilterParams;

/// Per-field options filter: fixed, or computed on every open
#[derive(Clone)]
pub enum OptionsFilter {
    Static(FilterParams),
    Dynamic(Rc<DynamicParams>),
}

impl Default for OptionsFilter {
    fn default() -> Self {
        OptionsFilter::Static(FilterParams::new())
    }
}

impl fmt::Debug for OptionsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsFilter::Static(params) => f.debug_tuple("Static").field(params).finish(),
            OptionsFilter::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl OptionsFilter {
    pub fn dynamic(f: impl Fn(&ResolveContext<'_>) -> FilterParams + 'static) -> Self {
        OptionsFilter::Dynamic(Rc::new(f))
    }

    /// Narrow options by whatever the owning pane currently filters on
    pub fn pane_filters() -> Self {
        Self::dynamic(|ctx| ctx.pane_filters.to_json_map())
    }

    /// `{"show_all": true}` when the current view holds `role`
    pub fn role_gate(role: impl Into<String>) -> Self {
        let role = role.into();
        Self::dynamic(move |ctx| {
            let show_all = ctx.view.roles().iter().any(|r| r == &role);
            let mut params = FilterParams::new();
            params.insert("show_all".to_string(), Value::Bool(show_all));
            params
        })
    }

    /// Evaluate the filter now and attach the current `view_as`
    ///
    /// Dynamic filters are never cached; each call sees the context as it is.
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> FilterParams {
        let mut params = match self {
            OptionsFilter::Static(params) => params.clone(),
            OptionsFilter::Dynamic(f) => f(ctx),
        };
        let view_as = serde_json::to_value(ctx.view).unwrap_or(Value::Null);
        params.insert("view_as".to_string(), view_as);
        params
    }
}
