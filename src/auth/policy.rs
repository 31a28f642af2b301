// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static authorization rules.
//!
//! Every request is classified by `(method, path)` against an ordered rule
//! table. The first matching rule wins. A request that matches nothing
//! requires authentication; nothing is public unless a rule says so.
//!
//! ## Patterns
//!
//! Patterns are matched segment by segment:
//!
//! - `users` matches the literal segment
//! - `{id}` or `*` matches exactly one segment
//! - `**` matches any number of trailing segments, including none
//!
//! Empty segments are ignored, so `/users/` and `//users` both match `/users`.

use axum::http::Method;

use super::Role;

/// What a request needs in order to be let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, with or without a token
    Public,
    /// Any valid token
    Authenticated,
    /// A valid token carrying exactly this role
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Rest,
}

/// Compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| match segment {
                "**" => Segment::Rest,
                "*" => Segment::Single,
                s if s.starts_with('{') && s.ends_with('}') => Segment::Single,
                s => Segment::Literal(s.to_string()),
            })
            .collect();

        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_path(path);

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Single => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(expected) => match parts.next() {
                    Some(part) if part == expected => {}
                    _ => return false,
                },
            }
        }

        parts.next().is_none()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// One entry of the rule table.
#[derive(Debug, Clone)]
pub struct AuthorizationRule {
    /// `None` matches every method
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl AuthorizationRule {
    pub fn new(method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        Self {
            method,
            pattern: PathPattern::new(pattern),
            requirement,
        }
    }

    pub fn public(method: Method, pattern: &str) -> Self {
        Self::new(Some(method), pattern, Requirement::Public)
    }

    pub fn authenticated(method: Method, pattern: &str) -> Self {
        Self::new(Some(method), pattern, Requirement::Authenticated)
    }

    pub fn role(method: Method, pattern: &str, role: Role) -> Self {
        Self::new(Some(method), pattern, Requirement::Role(role))
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// Ordered, first-match-wins rule table.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<AuthorizationRule>,
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<AuthorizationRule>) -> Self {
        Self { rules }
    }

    /// The rule table served by this application.
    pub fn standard() -> Self {
        Self::new(vec![
            AuthorizationRule::public(Method::POST, "/auth"),
            AuthorizationRule::public(Method::POST, "/users/register"),
            AuthorizationRule::public(Method::GET, "/health"),
            AuthorizationRule::new(None, "/swagger-ui/**", Requirement::Public),
            AuthorizationRule::new(None, "/v3/api-docs/**", Requirement::Public),
            AuthorizationRule::authenticated(Method::GET, "/userarea/myprofile"),
            AuthorizationRule::authenticated(Method::PUT, "/userarea/changepassword"),
            AuthorizationRule::role(Method::GET, "/users", Role::Admin),
            AuthorizationRule::role(Method::GET, "/users/{id}", Role::Admin),
        ])
    }

    /// Classify a request. Unmatched requests require authentication.
    pub fn classify(&self, method: &Method, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.requirement)
            .unwrap_or(Requirement::Authenticated)
    }
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(method: Method, path: &str) -> Requirement {
        AuthorizationPolicy::standard().classify(&method, path)
    }

    #[test]
    fn login_and_registration_are_public() {
        assert_eq!(classify(Method::POST, "/auth"), Requirement::Public);
        assert_eq!(classify(Method::POST, "/users/register"), Requirement::Public);
    }

    #[test]
    fn documentation_is_public() {
        assert_eq!(classify(Method::GET, "/swagger-ui"), Requirement::Public);
        assert_eq!(classify(Method::GET, "/swagger-ui/index.html"), Requirement::Public);
        assert_eq!(
            classify(Method::GET, "/v3/api-docs/openapi.json"),
            Requirement::Public
        );
    }

    #[test]
    fn user_area_needs_any_valid_token() {
        assert_eq!(
            classify(Method::GET, "/userarea/myprofile"),
            Requirement::Authenticated
        );
        assert_eq!(
            classify(Method::PUT, "/userarea/changepassword"),
            Requirement::Authenticated
        );
    }

    #[test]
    fn user_listing_needs_admin() {
        assert_eq!(classify(Method::GET, "/users"), Requirement::Role(Role::Admin));
        assert_eq!(
            classify(Method::GET, "/users/8f0c1a"),
            Requirement::Role(Role::Admin)
        );
        assert_eq!(classify(Method::GET, "/users/"), Requirement::Role(Role::Admin));
    }

    #[test]
    fn method_is_part_of_the_match() {
        // Only POST /auth is public; other methods fall to the default.
        assert_eq!(classify(Method::GET, "/auth"), Requirement::Authenticated);
        assert_eq!(
            classify(Method::DELETE, "/users/8f0c1a"),
            Requirement::Authenticated
        );
        assert_eq!(
            classify(Method::GET, "/userarea/changepassword"),
            Requirement::Authenticated
        );
    }

    #[test]
    fn unmatched_defaults_to_authenticated() {
        assert_eq!(classify(Method::GET, "/recursoinvalido"), Requirement::Authenticated);
        assert_eq!(classify(Method::GET, "/"), Requirement::Authenticated);
        assert_eq!(classify(Method::GET, "/users/a/b"), Requirement::Authenticated);
        assert_eq!(classify(Method::POST, "/auth/extra"), Requirement::Authenticated);
    }

    #[test]
    fn first_match_wins() {
        let policy = AuthorizationPolicy::new(vec![
            AuthorizationRule::public(Method::GET, "/reports/public"),
            AuthorizationRule::role(Method::GET, "/reports/{id}", Role::Admin),
            AuthorizationRule::role(Method::GET, "/reports/public", Role::User),
        ]);
        assert_eq!(
            policy.classify(&Method::GET, "/reports/public"),
            Requirement::Public
        );
        assert_eq!(
            policy.classify(&Method::GET, "/reports/7"),
            Requirement::Role(Role::Admin)
        );
    }

    #[test]
    fn empty_table_requires_authentication() {
        let policy = AuthorizationPolicy::new(Vec::new());
        assert_eq!(policy.classify(&Method::POST, "/auth"), Requirement::Authenticated);
    }

    #[test]
    fn pattern_matching() {
        let rest = PathPattern::new("/docs/**");
        assert!(rest.matches("/docs"));
        assert!(rest.matches("/docs/a/b/c"));
        assert!(!rest.matches("/doc"));

        let single = PathPattern::new("/items/*/detail");
        assert!(single.matches("/items/1/detail"));
        assert!(!single.matches("/items/detail"));
        assert!(!single.matches("/items/1/2/detail"));

        let literal = PathPattern::new("/users");
        assert!(literal.matches("//users/"));
        assert!(!literal.matches("/Users"));
        assert_eq!(literal.as_str(), "/users");
    }
}
