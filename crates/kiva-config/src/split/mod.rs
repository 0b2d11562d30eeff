//! Code-splitting policy.
//!
//! A [`SplittingPolicy`] is an explicitly ordered list of [`CacheGroup`]s
//! layered over global size bounds. [`SplittingPolicy::classify`] decides
//! which group, if any, claims a module before the bundler's default
//! chunking takes over:
//!
//! 1. groups are evaluated in declared order and every match is collected;
//! 2. an enforced match wins outright, size thresholds are never consulted;
//! 3. between enforced matches the higher priority wins (ties keep the
//!    earlier group);
//! 4. without an enforced match, the highest-priority plain match is
//!    returned together with the size bounds the bundler must apply;
//! 5. no match at all falls through to the bundler default.

mod group;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use group::{CacheGroup, ChunkScope, ModuleInfo, ModulePredicate, ModuleTest};

use crate::error::Result;
use crate::pattern::Pattern;

/// 30 KiB
pub const DEFAULT_MIN_SIZE: u64 = 30 * 1024;
/// 3 MiB
pub const DEFAULT_MAX_SIZE: u64 = 3 * 1024 * 1024;

/// Size window a non-enforced chunk must fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBounds {
    pub min_size: u64,
    pub max_size: u64,
}

/// Outcome of classifying one module.
#[derive(Debug, Clone, Copy)]
pub enum ChunkDecision<'p> {
    /// Claimed by an enforced group regardless of size
    Enforced(&'p CacheGroup),
    /// Candidate for a group; the bundler applies `bounds`
    Bounded {
        group: &'p CacheGroup,
        bounds: SizeBounds,
    },
    /// No group matched
    Default,
}

impl<'p> ChunkDecision<'p> {
    pub fn group(&self) -> Option<&'p CacheGroup> {
        match *self {
            ChunkDecision::Enforced(group) | ChunkDecision::Bounded { group, .. } => Some(group),
            ChunkDecision::Default => None,
        }
    }

    pub fn group_name(&self) -> Option<&'p str> {
        self.group().map(|group| group.name.as_str())
    }

    pub fn is_enforced(&self) -> bool {
        matches!(self, ChunkDecision::Enforced(_))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplittingPolicy {
    pub chunks: ChunkScope,
    pub min_size: u64,
    pub max_size: u64,
    pub min_chunks: usize,
    pub max_async_requests: usize,
    pub max_initial_requests: usize,
    pub automatic_name_delimiter: String,
    #[serde(serialize_with = "serialize_groups")]
    pub cache_groups: Vec<CacheGroup>,
}

impl SplittingPolicy {
    /// Global bounds with no cache groups.
    pub fn bounds_only() -> Self {
        Self {
            chunks: ChunkScope::Async,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            min_chunks: 1,
            max_async_requests: 6,
            max_initial_requests: 4,
            automatic_name_delimiter: "-".to_string(),
            cache_groups: Vec::new(),
        }
    }

    /// The application's policy: `common`, `vendors`, `react`, `antd`, `styles`.
    pub fn standard() -> Result<Self> {
        Ok(Self::bounds_only()
            .with_group(
                CacheGroup::new("common")
                    .priority(-20)
                    .min_chunks(2)
                    .reuse_existing_chunk(),
            )
            .with_group(
                CacheGroup::new("vendors")
                    .pattern(Pattern::new(r"[\\/]node_modules[\\/]")?)
                    .priority(-10),
            )
            .with_group(
                CacheGroup::new("react")
                    .pattern(Pattern::new(
                        r"[\\/]node_modules[\\/](scheduler|react|react-dom|prop-types)",
                    )?)
                    .enforce(),
            )
            .with_group(
                CacheGroup::new("antd")
                    .pattern(Pattern::new(r"[\\/]node_modules[\\/](@ant-design|antd)")?),
            )
            .with_group(
                CacheGroup::new("styles")
                    .pattern(Pattern::new(r"\.css$")?)
                    .enforce(),
            ))
    }

    /// Append a group; it is evaluated after every group already present.
    pub fn with_group(mut self, group: CacheGroup) -> Self {
        self.cache_groups.push(group);
        self
    }

    pub fn groups(&self) -> impl Iterator<Item = &CacheGroup> {
        self.cache_groups.iter()
    }

    pub fn group(&self, name: &str) -> Option<&CacheGroup> {
        self.cache_groups.iter().find(|group| group.name == name)
    }

    /// Size bounds for a group, falling back to the global ones.
    pub fn effective_bounds(&self, group: &CacheGroup) -> SizeBounds {
        SizeBounds {
            min_size: group.min_size.unwrap_or(self.min_size),
            max_size: group.max_size.unwrap_or(self.max_size),
        }
    }

    fn effective_min_chunks(&self, group: &CacheGroup) -> usize {
        match group.min_chunks {
            Some(min_chunks) => min_chunks,
            // Enforced groups ignore global thresholds
            None if group.enforce => 1,
            None => self.min_chunks,
        }
    }

    fn matches(&self, group: &CacheGroup, module: &ModuleInfo<'_>) -> bool {
        if module.chunks < self.effective_min_chunks(group) {
            return false;
        }

        match group.test.evaluate(module) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(
                    group = %group.name,
                    resource = module.resource,
                    "cache group test failed, treating as no match: {}",
                    err
                );
                false
            }
        }
    }

    /// Decide which group claims `module`.
    pub fn classify(&self, module: &ModuleInfo<'_>) -> ChunkDecision<'_> {
        let mut enforced: Option<&CacheGroup> = None;
        let mut bounded: Option<&CacheGroup> = None;

        for group in self.cache_groups.iter() {
            if !self.matches(group, module) {
                continue;
            }

            let slot = if group.enforce {
                &mut enforced
            } else {
                &mut bounded
            };
            // Strictly greater so the earlier declaration keeps ties
            if slot.is_none_or(|best| group.priority > best.priority) {
                *slot = Some(group);
            }
        }

        match (enforced, bounded) {
            (Some(group), _) => ChunkDecision::Enforced(group),
            (None, Some(group)) => ChunkDecision::Bounded {
                group,
                bounds: self.effective_bounds(group),
            },
            (None, None) => ChunkDecision::Default,
        }
    }
}

fn serialize_groups<S: Serializer>(
    groups: &[CacheGroup],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(groups.len()))?;
    for group in groups {
        map.serialize_entry(&group.name, group)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SplittingPolicy {
        SplittingPolicy::standard().unwrap()
    }

    #[test]
    fn groups_keep_declared_order() {
        let names: Vec<_> = policy().groups().map(|g| g.name.clone()).collect();
        assert_eq!(names, ["common", "vendors", "react", "antd", "styles"]);
    }

    #[test]
    fn framework_group_beats_vendors() {
        let policy = policy();
        for resource in [
            "/app/node_modules/react/index.js",
            "/app/node_modules/react-dom/cjs/react-dom.production.min.js",
            "C:\\app\\node_modules\\scheduler\\index.js",
            "/app/node_modules/prop-types/index.js",
        ] {
            let decision = policy.classify(&ModuleInfo::new(resource));
            assert_eq!(decision.group_name(), Some("react"), "{resource}");
            assert!(decision.is_enforced());
        }
    }

    #[test]
    fn framework_group_wins_even_when_vendors_outranks_it() {
        let policy = SplittingPolicy::bounds_only()
            .with_group(
                CacheGroup::new("vendors")
                    .pattern(Pattern::new(r"[\\/]node_modules[\\/]").unwrap())
                    .priority(100),
            )
            .with_group(
                CacheGroup::new("react")
                    .pattern(Pattern::new(r"[\\/]node_modules[\\/]react").unwrap())
                    .priority(-100)
                    .enforce(),
            );

        let decision = policy.classify(&ModuleInfo::new("/node_modules/react/index.js"));
        assert_eq!(decision.group_name(), Some("react"));
    }

    #[test]
    fn enforced_group_ignores_size_bounds() {
        let policy = policy();
        let huge = ModuleInfo::new("/node_modules/react-dom/index.js").with_size(50 * 1024 * 1024);
        let tiny = ModuleInfo::new("/src/app.css").with_size(1);

        assert_eq!(policy.classify(&huge).group_name(), Some("react"));
        assert_eq!(policy.classify(&tiny).group_name(), Some("styles"));
    }

    #[test]
    fn higher_priority_wins_between_enforced_groups() {
        let policy = SplittingPolicy::bounds_only()
            .with_group(
                CacheGroup::new("low")
                    .pattern(Pattern::new("lib").unwrap())
                    .priority(-5)
                    .enforce(),
            )
            .with_group(
                CacheGroup::new("high")
                    .pattern(Pattern::new("lib").unwrap())
                    .priority(-1)
                    .enforce(),
            );

        assert_eq!(
            policy.classify(&ModuleInfo::new("/lib/a.js")).group_name(),
            Some("high")
        );
    }

    #[test]
    fn equal_priority_keeps_declared_order() {
        let policy = SplittingPolicy::bounds_only()
            .with_group(
                CacheGroup::new("first")
                    .pattern(Pattern::new("x").unwrap())
                    .enforce(),
            )
            .with_group(
                CacheGroup::new("second")
                    .pattern(Pattern::new("x").unwrap())
                    .enforce(),
            );

        assert_eq!(
            policy.classify(&ModuleInfo::new("x.js")).group_name(),
            Some("first")
        );
    }

    #[test]
    fn component_library_is_bounded_candidate() {
        let policy = policy();
        let decision = policy.classify(&ModuleInfo::new("/node_modules/antd/lib/button/index.js"));

        match decision {
            ChunkDecision::Bounded { group, bounds } => {
                assert_eq!(group.name, "antd");
                assert_eq!(bounds.min_size, DEFAULT_MIN_SIZE);
                assert_eq!(bounds.max_size, DEFAULT_MAX_SIZE);
            }
            other => panic!("expected bounded antd, got {:?}", other),
        }
    }

    #[test]
    fn plain_third_party_goes_to_vendors() {
        let policy = policy();
        let decision = policy.classify(&ModuleInfo::new("/node_modules/lodash/map.js"));
        assert_eq!(decision.group_name(), Some("vendors"));
        assert!(!decision.is_enforced());
    }

    #[test]
    fn shared_application_module_goes_to_common() {
        let policy = policy();
        let once = ModuleInfo::new("/src/utils/date.ts");
        let shared = once.with_chunks(2);

        assert!(matches!(policy.classify(&once), ChunkDecision::Default));
        assert_eq!(policy.classify(&shared).group_name(), Some("common"));
    }

    #[test]
    fn vendors_outranks_common_for_shared_third_party() {
        let module = ModuleInfo::new("/node_modules/dayjs/index.js").with_chunks(3);
        assert_eq!(policy().classify(&module).group_name(), Some("vendors"));
    }

    #[test]
    fn group_override_replaces_global_bounds() {
        let policy = SplittingPolicy::bounds_only().with_group(
            CacheGroup::new("big")
                .pattern(Pattern::new("big").unwrap())
                .size_bounds(Some(1), None),
        );

        let bounds = match policy.classify(&ModuleInfo::new("big.js")) {
            ChunkDecision::Bounded { bounds, .. } => bounds,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(bounds.min_size, 1);
        assert_eq!(bounds.max_size, DEFAULT_MAX_SIZE);
    }

    #[test]
    fn failing_test_counts_as_no_match() {
        let policy = SplittingPolicy::bounds_only().with_group(
            CacheGroup::new("broken")
                .test(ModuleTest::custom(|_| Err("boom".to_string())))
                .enforce(),
        );

        assert!(matches!(
            policy.classify(&ModuleInfo::new("/src/index.ts")),
            ChunkDecision::Default
        ));
    }

    #[test]
    fn unmatched_module_falls_through() {
        let policy = policy();
        let decision = policy.classify(&ModuleInfo::new("/src/index.tsx"));
        assert!(matches!(decision, ChunkDecision::Default));
        assert_eq!(decision.group_name(), None);
    }

    #[test]
    fn serializes_cache_groups_in_declared_order() {
        let value = serde_json::to_value(policy()).unwrap();
        assert_eq!(value["chunks"], "async");
        assert_eq!(value["minSize"], 30720);
        assert_eq!(value["maxSize"], 3145728);
        assert_eq!(value["maxAsyncRequests"], 6);
        assert_eq!(value["maxInitialRequests"], 4);

        let groups = value["cacheGroups"].as_object().unwrap();
        let names: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(names, ["common", "vendors", "react", "antd", "styles"]);
        assert_eq!(groups["react"]["enforce"], true);
        assert_eq!(groups["common"]["reuseExistingChunk"], true);
        assert!(groups["common"].get("test").is_none());
    }
}
