//! Path-based view selection.
//!
//! ```text
//! /                         Home
//! /articles[/{slug}]        Articles, Article
//! /category/{slug}          Category
//! /magazines[/{slug}]       Magazines, Magazine
//! /leadership[/{slug}]      Leadership, Profile
//! /press-releases[/{slug}]  PressReleases, PressRelease
//! /about /contact /privacy-policy
//! /admin/...                Admin views (no public chrome, never indexed)
//! ```

use std::fmt;

use super::UrlPath;
use crate::content::Collection;
use crate::seo::schema::Crumb;

/// Prefix of every admin view.
pub const ADMIN_PREFIX: &str = "/admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Articles,
    Article { slug: String },
    Category { slug: String },
    Magazines,
    Magazine { slug: String },
    Leadership,
    Profile { slug: String },
    PressReleases,
    PressRelease { slug: String },
    About,
    Contact,
    Privacy,
    Admin(AdminView),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminView {
    Dashboard,
    Login,
    Settings,
    List(Collection),
    New(Collection),
    Edit { collection: Collection, id: String },
}

impl Route {
    /// Public views without parameters, in navigation order.
    pub const STATIC: [Route; 8] = [
        Route::Home,
        Route::Articles,
        Route::Magazines,
        Route::Leadership,
        Route::PressReleases,
        Route::About,
        Route::Contact,
        Route::Privacy,
    ];

    /// Classify a browser path. Unknown paths map to `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = UrlPath::from_browser(path);
        let segments: Vec<&str> = path.segments().collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["articles"] => Self::Articles,
            ["articles", slug] => Self::Article { slug: slug.to_string() },
            ["category", slug] => Self::Category { slug: slug.to_string() },
            ["magazines"] => Self::Magazines,
            ["magazines", slug] => Self::Magazine { slug: slug.to_string() },
            ["leadership"] => Self::Leadership,
            ["leadership", slug] => Self::Profile { slug: slug.to_string() },
            ["press-releases"] => Self::PressReleases,
            ["press-releases", slug] => Self::PressRelease { slug: slug.to_string() },
            ["about"] => Self::About,
            ["contact"] => Self::Contact,
            ["privacy-policy"] => Self::Privacy,
            ["admin", rest @ ..] => AdminView::parse(rest).map_or(Self::NotFound, Self::Admin),
            _ => Self::NotFound,
        }
    }

    /// Site path of the view.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Articles => "/articles".into(),
            Self::Article { slug } => format!("/articles/{slug}"),
            Self::Category { slug } => format!("/category/{slug}"),
            Self::Magazines => "/magazines".into(),
            Self::Magazine { slug } => format!("/magazines/{slug}"),
            Self::Leadership => "/leadership".into(),
            Self::Profile { slug } => format!("/leadership/{slug}"),
            Self::PressReleases => "/press-releases".into(),
            Self::PressRelease { slug } => format!("/press-releases/{slug}"),
            Self::About => "/about".into(),
            Self::Contact => "/contact".into(),
            Self::Privacy => "/privacy-policy".into(),
            Self::Admin(view) => view.path(),
            Self::NotFound => "/404".into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Admin and unknown views are never indexed.
    pub fn noindex(&self) -> bool {
        matches!(self, Self::Admin(_) | Self::NotFound)
    }

    /// Display label for listing and static views.
    pub fn label(&self) -> Option<&'static str> {
        Some(match self {
            Self::Home => "Home",
            Self::Articles => "Articles",
            Self::Magazines => "Magazines",
            Self::Leadership => "Leadership",
            Self::PressReleases => "Press Releases",
            Self::About => "About",
            Self::Contact => "Contact",
            Self::Privacy => "Privacy Policy",
            _ => return None,
        })
    }

    /// Listing view a detail view belongs to.
    pub fn parent(&self) -> Option<Route> {
        match self {
            Self::Article { .. } | Self::Category { .. } => Some(Self::Articles),
            Self::Magazine { .. } => Some(Self::Magazines),
            Self::Profile { .. } => Some(Self::Leadership),
            Self::PressRelease { .. } => Some(Self::PressReleases),
            _ => None,
        }
    }

    /// Collection behind a detail view.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            Self::Article { .. } => Some(Collection::Articles),
            Self::Category { .. } => Some(Collection::Categories),
            Self::Magazine { .. } => Some(Collection::Magazines),
            Self::Profile { .. } => Some(Collection::LeadershipProfiles),
            Self::PressRelease { .. } => Some(Collection::PressReleases),
            _ => None,
        }
    }

    /// Home-first trail for the BreadcrumbList schema.
    ///
    /// `leaf` names a detail view (article title, profile name); the slug is
    /// used without it. Admin and unknown views have no public trail, and
    /// neither does anything without an origin.
    pub fn breadcrumbs(&self, origin: Option<&str>, leaf: Option<&str>) -> Vec<Crumb> {
        let Some(origin) = origin.map(|o| o.trim_end_matches('/')).filter(|o| !o.is_empty())
        else {
            return Vec::new();
        };
        if self.noindex() {
            return Vec::new();
        }

        let crumb = |route: &Route, name: &str| Crumb::new(name, format!("{origin}{}", route.path()));
        let mut trail = vec![crumb(&Self::Home, "Home")];
        if *self == Self::Home {
            return trail;
        }

        if let Some(parent) = self.parent()
            && let Some(label) = parent.label()
        {
            trail.push(crumb(&parent, label));
        }

        let name = match (self.label(), leaf.map(str::trim).filter(|l| !l.is_empty())) {
            (Some(label), _) => label.to_string(),
            (None, Some(leaf)) => leaf.to_string(),
            (None, None) => self.slug().unwrap_or_default().to_string(),
        };
        trail.push(crumb(self, &name));
        trail
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Article { slug }
            | Self::Category { slug }
            | Self::Magazine { slug }
            | Self::Profile { slug }
            | Self::PressRelease { slug } => Some(slug),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl AdminView {
    fn parse(segments: &[&str]) -> Option<Self> {
        Some(match segments {
            [] => Self::Dashboard,
            ["login"] => Self::Login,
            ["settings"] => Self::Settings,
            [collection] => Self::List(collection.parse().ok()?),
            [collection, "new"] => Self::New(collection.parse().ok()?),
            [collection, id] => Self::Edit {
                collection: collection.parse().ok()?,
                id: id.to_string(),
            },
            _ => return None,
        })
    }

    pub fn path(&self) -> String {
        match self {
            Self::Dashboard => ADMIN_PREFIX.into(),
            Self::Login => format!("{ADMIN_PREFIX}/login"),
            Self::Settings => format!("{ADMIN_PREFIX}/settings"),
            Self::List(collection) => format!("{ADMIN_PREFIX}/{}", admin_segment(*collection)),
            Self::New(collection) => format!("{ADMIN_PREFIX}/{}/new", admin_segment(*collection)),
            Self::Edit { collection, id } => {
                format!("{ADMIN_PREFIX}/{}/{id}", admin_segment(*collection))
            }
        }
    }
}

fn admin_segment(collection: Collection) -> String {
    collection.as_str().replace('_', "-")
}
