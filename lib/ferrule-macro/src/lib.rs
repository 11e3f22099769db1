//! Procedural macro for the ferrule declarative HTTP client.
//!
//! `#[ferrule]` turns a trait of annotated `async fn`s into:
//! - a dyn-compatible trait (`Box<dyn Api>` works)
//! - an `ApiClient` struct implementing it on top of a `ferrule::Ferrule`
//! - a link-time registration so `Ferrule::create::<dyn Api>()` finds it
//!
//! # Example
//!
//! ```ignore
//! use ferrule::prelude::*;
//!
//! #[ferrule]
//! pub trait GitHubApi {
//!     #[get("/users/{username}")]
//!     async fn get_user(&self, #[path] username: &str) -> ferrule::Result<User>;
//! }
//!
//! let ferrule = Ferrule::new("https://api.github.com", HyperTransport::new());
//! let github = ferrule.create::<dyn GitHubApi>()?;
//! let user = github.get_user("octocat").await?;
//! ```

mod attrs;
mod codegen;
mod expand;
mod types;

use proc_macro::TokenStream;

/// Generate an HTTP client for a trait.
///
/// # Method attributes
///
/// - `#[get("/path")]`, `#[post]`, `#[put]`, `#[delete]`, `#[patch]`, `#[head]`, `#[options]`
/// - `#[http("VERB /path")]` or `#[http(method = "VERB", path = "/path", has_body = true)]`
/// - `#[form_url_encoded]` (aliases `#[from_url_encoded]`, `#[from_url_coded]`), `#[multipart]`
/// - `#[streaming]` - the reply is returned as raw bytes
/// - `#[headers("Key: Value", ...)]` - static headers
///
/// # Parameter attributes
///
/// - `#[path]`, `#[query]`, `#[field]`, `#[part]`, `#[header]` - optionally named, e.g. `#[query("q")]`
/// - `#[query_map]`, `#[field_map]`, `#[part_map]` - map-like parameters
/// - `#[body]` - JSON body
/// - `#[url]` - replaces the path
///
/// # Options
///
/// - `register = false` - skip the link-time registration
///
/// # Example
///
/// ```ignore
/// #[ferrule]
/// pub trait UserApi {
///     #[get("/users")]
///     async fn list(&self, #[query] page: Option<u32>) -> ferrule::Result<Vec<User>>;
///
///     #[post("/users")]
///     #[headers("Accept: application/json")]
///     async fn create(&self, #[body] user: &NewUser) -> ferrule::Result<User>;
/// }
///
/// let users = UserApiClient::new(ferrule);
/// let page = users.list(Some(2)).await?;
/// ```
#[proc_macro_attribute]
pub fn ferrule(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::expand_ferrule_trait(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
