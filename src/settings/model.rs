//! Settings data: the effective object and the partial patch applied to it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Final merged settings consumed by rendering. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub site_title: String,
    pub company_name: String,
    pub site_logo: Option<String>,
    pub primary_color: String,
    pub analytics_code: String,
    pub homepage_sections: HomepageSections,
    pub hero_main_article_id: Option<String>,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            site_title: "Masthead".into(),
            company_name: "Masthead Media".into(),
            site_logo: None,
            primary_color: "#1e3a5f".into(),
            analytics_code: String::new(),
            homepage_sections: HomepageSections::default(),
            hero_main_article_id: None,
        }
    }
}

/// Which homepage blocks are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageSections {
    pub featured_articles: bool,
    pub latest_magazine: bool,
    pub leadership_profiles: bool,
    pub press_releases: bool,
    pub industry_news: bool,
}

impl Default for HomepageSections {
    fn default() -> Self {
        Self {
            featured_articles: true,
            latest_magazine: true,
            leadership_profiles: true,
            press_releases: true,
            industry_news: true,
        }
    }
}

/// Name of a single homepage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomepageSection {
    FeaturedArticles,
    LatestMagazine,
    LeadershipProfiles,
    PressReleases,
    IndustryNews,
}

impl HomepageSection {
    pub const ALL: [Self; 5] = [
        Self::FeaturedArticles,
        Self::LatestMagazine,
        Self::LeadershipProfiles,
        Self::PressReleases,
        Self::IndustryNews,
    ];

    /// Key used in the persisted blob.
    pub const fn key(self) -> &'static str {
        match self {
            Self::FeaturedArticles => "featuredArticles",
            Self::LatestMagazine => "latestMagazine",
            Self::LeadershipProfiles => "leadershipProfiles",
            Self::PressReleases => "pressReleases",
            Self::IndustryNews => "industryNews",
        }
    }

    pub fn is_enabled(self, sections: &HomepageSections) -> bool {
        match self {
            Self::FeaturedArticles => sections.featured_articles,
            Self::LatestMagazine => sections.latest_magazine,
            Self::LeadershipProfiles => sections.leadership_profiles,
            Self::PressReleases => sections.press_releases,
            Self::IndustryNews => sections.industry_news,
        }
    }
}

impl fmt::Display for HomepageSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for HomepageSection {
    type Err = String;

    /// Accepts the blob key (`featuredArticles`) or its snake/kebab form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|section| section.key().to_ascii_lowercase() == folded)
            .ok_or_else(|| format!("unknown homepage section '{s}'"))
    }
}

// ============================================================================
// patches
// ============================================================================

/// Partial settings. Absent fields keep their previous value.
///
/// `siteLogo` and `heroMainArticleId` are nullable: `"siteLogo": null`
/// clears the logo, while omitting the key leaves it alone. Other keys
/// set to `null` count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub site_logo: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage_sections: Option<HomepageSectionsPatch>,
    #[serde(
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub hero_main_article_id: Option<Option<String>>,
}

/// Partial homepage flags, merged key by key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomepageSectionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_articles: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_magazine: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leadership_profiles: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub press_releases: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_news: Option<bool>,
}

/// Present-but-null deserializes to `Some(None)`; a missing key stays `None`
/// through `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl SettingsPatch {
    /// Patch touching exactly one homepage flag.
    pub fn homepage_section(section: HomepageSection, enabled: bool) -> Self {
        Self {
            homepage_sections: Some(HomepageSectionsPatch::single(section, enabled)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow merge over `base`.
    pub fn apply_to(&self, base: &EffectiveSettings) -> EffectiveSettings {
        let mut merged = base.clone();
        if let Some(title) = &self.site_title {
            merged.site_title.clone_from(title);
        }
        if let Some(name) = &self.company_name {
            merged.company_name.clone_from(name);
        }
        if let Some(logo) = &self.site_logo {
            merged.site_logo.clone_from(logo);
        }
        if let Some(color) = &self.primary_color {
            merged.primary_color.clone_from(color);
        }
        if let Some(code) = &self.analytics_code {
            merged.analytics_code.clone_from(code);
        }
        if let Some(sections) = &self.homepage_sections {
            merged.homepage_sections = sections.apply_to(&base.homepage_sections);
        }
        if let Some(hero) = &self.hero_main_article_id {
            merged.hero_main_article_id.clone_from(hero);
        }
        merged
    }
}

impl HomepageSectionsPatch {
    pub fn single(section: HomepageSection, enabled: bool) -> Self {
        let mut patch = Self::default();
        let slot = match section {
            HomepageSection::FeaturedArticles => &mut patch.featured_articles,
            HomepageSection::LatestMagazine => &mut patch.latest_magazine,
            HomepageSection::LeadershipProfiles => &mut patch.leadership_profiles,
            HomepageSection::PressReleases => &mut patch.press_releases,
            HomepageSection::IndustryNews => &mut patch.industry_news,
        };
        *slot = Some(enabled);
        patch
    }

    pub fn apply_to(&self, base: &HomepageSections) -> HomepageSections {
        HomepageSections {
            featured_articles: self.featured_articles.unwrap_or(base.featured_articles),
            latest_magazine: self.latest_magazine.unwrap_or(base.latest_magazine),
            leadership_profiles: self.leadership_profiles.unwrap_or(base.leadership_profiles),
            press_releases: self.press_releases.unwrap_or(base.press_releases),
            industry_news: self.industry_news.unwrap_or(base.industry_news),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_settings_camel_case() {
        let json = serde_json::to_value(EffectiveSettings::default()).unwrap();
        assert!(json.get("siteTitle").is_some());
        assert!(json["homepageSections"].get("featuredArticles").is_some());
        assert!(json.get("heroMainArticleId").unwrap().is_null());
    }

    #[test]
    fn test_patch_nullable_fields() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"siteLogo": null, "siteTitle": null}"#).unwrap();
        assert_eq!(patch.site_logo, Some(None));
        assert_eq!(patch.site_title, None);
        assert_eq!(patch.hero_main_article_id, None);

        let base = EffectiveSettings {
            site_logo: Some("/logo.png".into()),
            ..EffectiveSettings::default()
        };
        let merged = patch.apply_to(&base);
        assert_eq!(merged.site_logo, None);
        assert_eq!(merged.site_title, base.site_title);
    }

    #[test]
    fn test_homepage_sections_merge_key_by_key() {
        let base = HomepageSections {
            press_releases: false,
            ..HomepageSections::default()
        };
        let patch: HomepageSectionsPatch =
            serde_json::from_str(r#"{"featuredArticles": false}"#).unwrap();
        let merged = patch.apply_to(&base);
        assert!(!merged.featured_articles);
        assert!(!merged.press_releases);
        assert!(merged.latest_magazine);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = SettingsPatch {
            analytics_code: Some("GA-1".into()),
            site_logo: Some(None),
            ..SettingsPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"siteLogo":null,"analyticsCode":"GA-1"}"#);
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!(
            "featuredArticles".parse::<HomepageSection>(),
            Ok(HomepageSection::FeaturedArticles)
        );
        assert_eq!(
            "industry-news".parse::<HomepageSection>(),
            Ok(HomepageSection::IndustryNews)
        );
        assert_eq!(
            "press_releases".parse::<HomepageSection>(),
            Ok(HomepageSection::PressReleases)
        );
        assert!("sidebar".parse::<HomepageSection>().is_err());
    }

    #[test]
    fn test_single_section_patch() {
        let patch = SettingsPatch::homepage_section(HomepageSection::LatestMagazine, false);
        let merged = patch.apply_to(&EffectiveSettings::default());
        assert!(!merged.homepage_sections.latest_magazine);
        assert!(HomepageSection::FeaturedArticles.is_enabled(&merged.homepage_sections));
        assert_eq!(merged.site_title, EffectiveSettings::default().site_title);
    }
}
