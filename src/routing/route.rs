//! A compiled route block.
//!
//! # Design Decisions
//! - Built once from `RouteConfig` with its invoker passed in; no setters
//! - Single-function routes are a separate selector variant, so include
//!   and exclude rules cannot be consulted for them
//! - Empty `single` and `qualifier` strings count as unset

use std::sync::Arc;

use bytes::Bytes;

use crate::config::RouteConfig;
use crate::envelope::{path_for_metadata, RequestMeta};
use crate::invoker::{InvokeError, Invoker};
use crate::replacer::Replacer;
use crate::routing::resolver::{accepts_function, parse_function_name};

/// How a route picks the function to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionSelector {
    /// Every request invokes this function.
    Single(String),
    /// The name is parsed from the path and filtered.
    Parsed {
        include: Vec<String>,
        exclude: Vec<String>,
        prepend: String,
        append: String,
    },
}

/// A function chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFunction {
    /// Name as it appears in the path (or the single name).
    pub name: String,
    /// Name passed to the invoker, after prepend/append.
    pub invoke_name: String,
}

/// One path prefix and everything needed to serve requests under it.
#[derive(Debug)]
pub struct Route {
    path_prefix: String,
    selector: FunctionSelector,
    strip_path_prefix: bool,
    qualifier: Option<String>,
    upstream_headers: Vec<(String, Vec<String>)>,
    invoker: Arc<dyn Invoker>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl Route {
    /// Compile a route block, binding it to `invoker` for its lifetime.
    pub fn new(config: &RouteConfig, invoker: Arc<dyn Invoker>) -> Self {
        let selector = match non_empty(&config.single) {
            Some(name) => FunctionSelector::Single(name),
            None => FunctionSelector::Parsed {
                include: config.include.clone(),
                exclude: config.exclude.clone(),
                prepend: config.name_prepend.clone(),
                append: config.name_append.clone(),
            },
        };

        Self {
            path_prefix: config.path.clone(),
            selector,
            strip_path_prefix: config.strip_path_prefix,
            qualifier: non_empty(&config.qualifier),
            upstream_headers: config
                .upstream_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            invoker,
        }
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn selector(&self) -> &FunctionSelector {
        &self.selector
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_single(&self) -> bool {
        matches!(self.selector, FunctionSelector::Single(_))
    }

    /// Literal prefix match against the request path.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix)
    }

    /// Pick the function for `path`, or `None` if the name is rejected.
    pub fn resolve(&self, path: &str) -> Option<ResolvedFunction> {
        match &self.selector {
            FunctionSelector::Single(name) => Some(ResolvedFunction {
                name: name.clone(),
                invoke_name: name.clone(),
            }),
            FunctionSelector::Parsed {
                include,
                exclude,
                prepend,
                append,
            } => {
                let name = parse_function_name(path, &self.path_prefix);
                if !accepts_function(name, include, exclude) {
                    return None;
                }
                Some(ResolvedFunction {
                    name: name.to_string(),
                    invoke_name: format!("{}{}{}", prepend, name, append),
                })
            }
        }
    }

    /// Rewrite the envelope path and inject upstream headers.
    pub fn prepare_meta(
        &self,
        meta: &mut RequestMeta,
        function: &ResolvedFunction,
        replacer: &dyn Replacer,
    ) {
        if self.strip_path_prefix {
            meta.path = path_for_metadata(
                &meta.path,
                &self.path_prefix,
                &function.name,
                true,
                self.is_single(),
            );
        }

        for (name, templates) in &self.upstream_headers {
            let values = templates.iter().map(|t| replacer.replace(t)).collect();
            meta.set_header(name, values);
        }
    }

    /// Call the bound invoker with this route's qualifier.
    pub async fn invoke(&self, function_name: &str, payload: Bytes) -> Result<Bytes, InvokeError> {
        self.invoker
            .invoke(function_name, payload, self.qualifier())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replacer::NoopReplacer;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct EchoInvoker;

    #[async_trait]
    impl Invoker for EchoInvoker {
        async fn invoke(
            &self,
            function_name: &str,
            _payload: Bytes,
            qualifier: Option<&str>,
        ) -> Result<Bytes, InvokeError> {
            Ok(Bytes::from(format!("{}@{}", function_name, qualifier.unwrap_or("-"))))
        }
    }

    fn route(config: RouteConfig) -> Route {
        Route::new(&config, Arc::new(EchoInvoker))
    }

    #[test]
    fn test_resolve_applies_transforms_after_filtering() {
        let mut config = RouteConfig::new("/api/");
        config.include = vec!["user*".into()];
        config.name_prepend = "before-".into();
        config.name_append = "-after".into();
        let route = route(config);

        let resolved = route.resolve("/api/user/42").unwrap();
        assert_eq!(resolved.name, "user");
        assert_eq!(resolved.invoke_name, "before-user-after");

        // Rules see the parsed name, not the transformed one.
        assert!(route.resolve("/api/before-user").is_none());
        assert!(route.resolve("/api/").is_none());
    }

    #[test]
    fn test_single_bypasses_filters() {
        let mut config = RouteConfig::new("/api/");
        config.single = Some("single-func".into());
        config.include = vec!["foo".into()];
        config.exclude = vec!["single*".into()];
        config.name_prepend = "ignored-".into();
        let route = route(config);

        assert!(route.is_single());
        let resolved = route.resolve("/api/user").unwrap();
        assert_eq!(resolved.invoke_name, "single-func");
        assert_eq!(route.resolve("/api/").unwrap().name, "single-func");
    }

    #[test]
    fn test_empty_single_and_qualifier_are_unset() {
        let mut config = RouteConfig::new("/api/");
        config.single = Some(String::new());
        config.qualifier = Some(String::new());
        let route = route(config);

        assert!(!route.is_single());
        assert_eq!(route.qualifier(), None);
    }

    #[test]
    fn test_prepare_meta_strips_and_injects() {
        let mut config = RouteConfig::new("/api/");
        config.strip_path_prefix = true;
        config
            .upstream_headers
            .insert("X-Static".into(), vec!["v1".into(), "v2".into()]);
        let route = route(config);

        let mut meta = RequestMeta {
            path: "/api/foo/bar".into(),
            ..RequestMeta::default()
        };
        meta.headers.insert("x-static".into(), vec!["client".into()]);

        let function = route.resolve("/api/foo/bar").unwrap();
        route.prepare_meta(&mut meta, &function, &NoopReplacer);

        assert_eq!(meta.path, "/bar");
        assert_eq!(meta.headers["x-static"], vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_invoke_forwards_qualifier() {
        let mut config = RouteConfig::new("/api/");
        config.qualifier = Some("prod".into());
        let route = route(config);

        let reply = route.invoke("fn", Bytes::new()).await.unwrap();
        assert_eq!(reply, "fn@prod");
    }
}
