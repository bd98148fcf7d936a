//! Named content collections of the hosted backend.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Articles,
    Categories,
    ClientLogos,
    LeadershipProfiles,
    Magazines,
    MagazineArticles,
    PressReleases,
    Settings,
    UpcomingEditions,
}

impl Collection {
    pub const ALL: [Self; 9] = [
        Self::Articles,
        Self::Categories,
        Self::ClientLogos,
        Self::LeadershipProfiles,
        Self::Magazines,
        Self::MagazineArticles,
        Self::PressReleases,
        Self::Settings,
        Self::UpcomingEditions,
    ];

    /// Table name on the backend.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Articles => "articles",
            Self::Categories => "categories",
            Self::ClientLogos => "client_logos",
            Self::LeadershipProfiles => "leadership_profiles",
            Self::Magazines => "magazines",
            Self::MagazineArticles => "magazine_articles",
            Self::PressReleases => "press_releases",
            Self::Settings => "settings",
            Self::UpcomingEditions => "upcoming_editions",
        }
    }

    /// Column that identifies a row.
    pub const fn key_column(self) -> &'static str {
        match self {
            Self::Settings => "key",
            _ => "id",
        }
    }

    /// Whether rows carry a unique `slug`.
    pub const fn has_slug(self) -> bool {
        matches!(
            self,
            Self::Articles
                | Self::Categories
                | Self::LeadershipProfiles
                | Self::Magazines
                | Self::PressReleases
        )
    }

    /// Column a new row's slug is derived from.
    pub const fn slug_source(self) -> &'static str {
        match self {
            Self::Categories | Self::LeadershipProfiles => "name",
            _ => "title",
        }
    }

    /// Collections whose cached views embed rows of `self`.
    pub const fn related(self) -> &'static [Self] {
        match self {
            Self::Magazines => &[Self::MagazineArticles],
            Self::Categories => &[Self::Articles],
            _ => &[],
        }
    }

    /// Whether the collection feeds the dashboard counts.
    pub const fn counted(self) -> bool {
        matches!(
            self,
            Self::Articles | Self::Magazines | Self::LeadershipProfiles | Self::PressReleases
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown collection '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_names() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>(), Ok(collection));
        }
        assert_eq!("press-releases".parse(), Ok(Collection::PressReleases));
        assert!("users".parse::<Collection>().is_err());
    }

    #[test]
    fn test_related() {
        assert_eq!(Collection::Magazines.related(), &[Collection::MagazineArticles]);
        assert!(Collection::LeadershipProfiles.related().is_empty());
    }

    #[test]
    fn test_serde_name() {
        assert_eq!(
            serde_json::to_string(&Collection::ClientLogos).unwrap(),
            "\"client_logos\""
        );
    }
}
