//! Navigation targets.
//!
//! Every screen has a path, so links (tab hrefs, the catalog menu item)
//! navigate by path and the app resolves the path to a screen.

use dagdeck_core::AssetKey;

/// Tabs of the instance section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceTab {
    Overview,
    Health,
    Schedules,
    Sensors,
    Backfills,
    Config,
}

impl InstanceTab {
    pub const ALL: [InstanceTab; 6] = [
        Self::Overview,
        Self::Health,
        Self::Schedules,
        Self::Sensors,
        Self::Backfills,
        Self::Config,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Health => "health",
            Self::Schedules => "schedules",
            Self::Sensors => "sensors",
            Self::Backfills => "backfills",
            Self::Config => "config",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }

    pub fn path(self) -> String {
        format!("/instance/{}", self.id())
    }
}

/// A screen of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The asset dependency graph
    AssetGraph,
    /// An instance section tab
    Instance(InstanceTab),
    /// Catalog page of a single asset
    AssetCatalog(AssetKey),
}

const INSTANCE_PREFIX: &str = "/instance";
const ASSETS_PREFIX: &str = "/instance/assets/";

impl Route {
    /// Resolve a path. Returns None for paths that name no screen.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let trimmed = path.trim_end_matches('/');

        if trimmed.is_empty() {
            return Some(Self::AssetGraph);
        }
        if trimmed == INSTANCE_PREFIX {
            return Some(Self::Instance(InstanceTab::Overview));
        }
        if let Some(rest) = path.strip_prefix(ASSETS_PREFIX) {
            let key = AssetKey::from_url_path(rest);
            return if key.path.is_empty() {
                None
            } else {
                Some(Self::AssetCatalog(key))
            };
        }
        trimmed
            .strip_prefix(INSTANCE_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(InstanceTab::from_id)
            .map(Self::Instance)
    }

    pub fn path(&self) -> String {
        match self {
            Self::AssetGraph => "/".to_string(),
            Self::Instance(tab) => tab.path(),
            Self::AssetCatalog(key) => catalog_path(key),
        }
    }
}

/// Catalog URL of an asset.
///
/// Segments are joined with `/` unescaped, so a segment containing `/` or an
/// empty segment does not parse back to the same key.
pub fn catalog_path(key: &AssetKey) -> String {
    format!("{}{}", ASSETS_PREFIX, key.url_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instance_tabs() {
        for tab in InstanceTab::ALL {
            assert_eq!(Route::parse(&tab.path()), Some(Route::Instance(tab)));
        }
        assert_eq!(
            Route::parse("/instance"),
            Some(Route::Instance(InstanceTab::Overview))
        );
        assert_eq!(
            Route::parse("/instance/sensors/"),
            Some(Route::Instance(InstanceTab::Sensors))
        );
    }

    #[test]
    fn test_parse_catalog_path() {
        let key = AssetKey::new(["warehouse", "orders"]);
        assert_eq!(catalog_path(&key), "/instance/assets/warehouse/orders");
        assert_eq!(
            Route::parse("/instance/assets/warehouse/orders"),
            Some(Route::AssetCatalog(key))
        );
        assert_eq!(Route::parse("/instance/assets/"), None);
    }

    #[test]
    fn test_parse_graph_and_unknown() {
        assert_eq!(Route::parse("/"), Some(Route::AssetGraph));
        assert_eq!(Route::parse(""), Some(Route::AssetGraph));
        assert_eq!(Route::parse("/instance/nope"), None);
        assert_eq!(Route::parse("/runs"), None);
    }

    #[test]
    fn test_catalog_path_splits_slashes_and_drops_empty_segments() {
        let slashed = AssetKey::new(["s3", "bucket/prefix"]);
        assert_eq!(catalog_path(&slashed), "/instance/assets/s3/bucket/prefix");
        assert_eq!(
            Route::parse(&catalog_path(&slashed)),
            Some(Route::AssetCatalog(AssetKey::new(["s3", "bucket", "prefix"])))
        );

        let empty = AssetKey::new(["", "orders"]);
        assert_eq!(catalog_path(&empty), "/instance/assets//orders");
        assert_eq!(
            Route::parse(&catalog_path(&empty)),
            Some(Route::AssetCatalog(AssetKey::new(["orders"])))
        );
    }

    #[test]
    fn test_route_path_round_trips() {
        let routes = [
            Route::AssetGraph,
            Route::Instance(InstanceTab::Backfills),
            Route::AssetCatalog(AssetKey::new(["a", "b"])),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }
}
