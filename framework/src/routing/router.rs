use crate::http::{Request, Response};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for route handlers
pub type BoxedHandler =
    Box<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// HTTP router: one path table per method
pub struct Router {
    get_routes: MatchitRouter<Arc<BoxedHandler>>,
    post_routes: MatchitRouter<Arc<BoxedHandler>>,
    put_routes: MatchitRouter<Arc<BoxedHandler>>,
    patch_routes: MatchitRouter<Arc<BoxedHandler>>,
    delete_routes: MatchitRouter<Arc<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            get_routes: MatchitRouter::new(),
            post_routes: MatchitRouter::new(),
            put_routes: MatchitRouter::new(),
            patch_routes: MatchitRouter::new(),
            delete_routes: MatchitRouter::new(),
        }
    }

    fn insert<H, Fut>(mut self, method: http::Method, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let handler: BoxedHandler = Box::new(move |req| Box::pin(handler(req)));
        let table = match method {
            http::Method::GET => &mut self.get_routes,
            http::Method::POST => &mut self.post_routes,
            http::Method::PUT => &mut self.put_routes,
            http::Method::PATCH => &mut self.patch_routes,
            http::Method::DELETE => &mut self.delete_routes,
            _ => {
                tracing::error!(%method, path, "unsupported method, route not registered");
                return self;
            }
        };
        if let Err(e) = table.insert(path, Arc::new(handler)) {
            tracing::error!(%method, path, error = %e, "route not registered");
        }
        self
    }

    /// Register a GET route
    pub fn get<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(http::Method::GET, path, handler)
    }

    /// Register a POST route
    pub fn post<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(http::Method::POST, path, handler)
    }

    /// Register a PUT route
    pub fn put<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(http::Method::PUT, path, handler)
    }

    /// Register a PATCH route
    pub fn patch<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(http::Method::PATCH, path, handler)
    }

    /// Register a DELETE route
    pub fn delete<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(http::Method::DELETE, path, handler)
    }

    /// Match a request and return the handler with extracted params
    pub fn match_route(
        &self,
        method: &http::Method,
        path: &str,
    ) -> Option<(Arc<BoxedHandler>, HashMap<String, String>)> {
        let router = match *method {
            http::Method::GET => &self.get_routes,
            http::Method::POST => &self.post_routes,
            http::Method::PUT => &self.put_routes,
            http::Method::PATCH => &self.patch_routes,
            http::Method::DELETE => &self.delete_routes,
            _ => return None,
        };

        router.at(path).ok().map(|matched| {
            let params: HashMap<String, String> = matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (matched.value.clone(), params)
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind shared state to a handler taking `(state, request)`
///
/// ```rust,ignore
/// Router::new().get("/todos/{id}/todo-list", with_state(state.clone(), todo::todo_list))
/// ```
pub fn with_state<S, H, Fut>(state: S, handler: H) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    S: Clone + Send + Sync + 'static,
    H: Fn(S, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    move |req| handler(state.clone(), req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::text;

    async fn ok(_req: Request) -> Response {
        text("ok")
    }

    #[test]
    fn test_static_segments_win_over_params() {
        let router = Router::new()
            .get("/todo-lists/count", ok)
            .get("/todo-lists/{id}", ok)
            .patch("/todo-lists/{id}", ok);

        let (_, params) = router
            .match_route(&http::Method::GET, "/todo-lists/count")
            .unwrap();
        assert!(params.is_empty());

        let (_, params) = router
            .match_route(&http::Method::GET, "/todo-lists/7")
            .unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("7"));

        assert!(router
            .match_route(&http::Method::PATCH, "/todo-lists/7")
            .is_some());
        assert!(router
            .match_route(&http::Method::PUT, "/todo-lists/7")
            .is_none());
        assert!(router.match_route(&http::Method::GET, "/nope").is_none());
    }

    #[test]
    fn test_other_methods_are_not_registered() {
        let router = Router::new().insert(http::Method::OPTIONS, "/todo-lists", ok);

        assert!(router
            .match_route(&http::Method::DELETE, "/todo-lists")
            .is_none());
        assert!(router
            .match_route(&http::Method::OPTIONS, "/todo-lists")
            .is_none());
    }
}
