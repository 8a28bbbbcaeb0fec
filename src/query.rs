//! Client-side query cache
//!
//! Every read the client performs is identified by a [`QueryKey`]. Results
//! are kept in a [`QueryCache`] until a related write invalidates them, at
//! which point the next view of that data refetches it. Keys are grouped
//! into [`QueryScope`]s so a write can invalidate e.g. every comment list
//! at once without knowing which posts were opened.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Group of related queries, invalidated together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// The public feed
    Feed,
    /// Single posts
    Post,
    /// Comment lists
    Comments,
    /// The logged-in user's profile
    Profile,
    /// Other users' profiles
    User,
    /// Post lists filtered by author or tag
    PostLists,
    /// Followers and following lists
    Follows,
    /// Bookmarked posts
    Bookmarks,
    /// The logged-in user's account
    CurrentUser,
}

/// Identity of one read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Feed page
    Feed {
        /// 1-based page
        page: u32,
    },
    /// Single post by ID
    Post(String),
    /// Comments of a post
    Comments(String),
    /// Own profile
    Profile,
    /// Profile of a username
    User(String),
    /// Own posts
    MyPosts {
        /// 1-based page
        page: u32,
    },
    /// Posts by a username
    UserPosts {
        /// Author
        username: String,
        /// 1-based page
        page: u32,
    },
    /// Posts with a tag
    TagPosts {
        /// Tag without `#`
        tag: String,
        /// 1-based page
        page: u32,
    },
    /// Followers of a username
    Followers(String),
    /// Accounts a username follows
    Following(String),
    /// Own bookmarks
    Bookmarks {
        /// 1-based page
        page: u32,
    },
    /// Own account
    CurrentUser,
}

impl QueryKey {
    /// Scope this key belongs to
    pub const fn scope(&self) -> QueryScope {
        match self {
            Self::Feed { .. } => QueryScope::Feed,
            Self::Post(_) => QueryScope::Post,
            Self::Comments(_) => QueryScope::Comments,
            Self::Profile => QueryScope::Profile,
            Self::User(_) => QueryScope::User,
            Self::MyPosts { .. } | Self::UserPosts { .. } | Self::TagPosts { .. } => {
                QueryScope::PostLists
            }
            Self::Followers(_) | Self::Following(_) => QueryScope::Follows,
            Self::Bookmarks { .. } => QueryScope::Bookmarks,
            Self::CurrentUser => QueryScope::CurrentUser,
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
    invalidated: bool,
}

/// Cache of query results with scope-based invalidation
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, Entry<V>>,
    in_flight: HashSet<QueryKey>,
    // In-flight keys invalidated after their request went out
    outdated: HashSet<QueryKey>,
    stale_after: Duration,
}

impl<V> QueryCache<V> {
    /// Cache whose entries go stale `stale_after` after being fetched
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
            outdated: HashSet::new(),
            stale_after,
        }
    }

    /// Cached value, fresh or not
    pub fn get(&self, key: &QueryKey) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Mutable cached value (for optimistic updates)
    pub fn get_mut(&mut self, key: &QueryKey) -> Option<&mut V> {
        self.entries.get_mut(key).map(|e| &mut e.value)
    }

    /// Mutable access to every cached value (for optimistic updates that
    /// must reach all lists showing the same item)
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut().map(|e| &mut e.value)
    }

    /// Store a fetched value and clear its in-flight mark.
    ///
    /// Returns `true` when the key was invalidated while the request was
    /// running: the value is kept for display but stays stale, and the
    /// caller should fetch it again.
    pub fn insert(&mut self, key: QueryKey, value: V) -> bool {
        self.insert_at(key, value, Instant::now())
    }

    fn insert_at(&mut self, key: QueryKey, value: V, now: Instant) -> bool {
        self.in_flight.remove(&key);
        let outdated = self.outdated.remove(&key);
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: now,
                invalidated: outdated,
            },
        );
        outdated
    }

    /// Store a value a write returned. In-flight marks are left alone, so
    /// an older request still running for `key` lands stale.
    pub fn set(&mut self, key: QueryKey, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Whether `key` should be refetched
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.is_stale_at(key, Instant::now())
    }

    fn is_stale_at(&self, key: &QueryKey, now: Instant) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(entry) if entry.invalidated => true,
            // The own profile is only refetched after a write touches it
            Some(_) if key.scope() == QueryScope::Profile => false,
            Some(entry) => now.saturating_duration_since(entry.fetched_at) >= self.stale_after,
        }
    }

    /// Mark `key` as being fetched. Returns `false` when the key is fresh
    /// or already in flight, in which case no request should be sent.
    pub fn begin_fetch(&mut self, key: &QueryKey) -> bool {
        if self.in_flight.contains(key) || !self.is_stale(key) {
            return false;
        }
        self.in_flight.insert(key.clone());
        true
    }

    /// Clear the in-flight mark after a failed fetch
    pub fn fail_fetch(&mut self, key: &QueryKey) {
        self.in_flight.remove(key);
        self.outdated.remove(key);
    }

    /// Whether a fetch for `key` is running
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Mark every entry in `scope` stale
    pub fn invalidate_scope(&mut self, scope: QueryScope) {
        for (key, entry) in &mut self.entries {
            if key.scope() == scope {
                entry.invalidated = true;
            }
        }
        self.outdated.extend(
            self.in_flight
                .iter()
                .filter(|key| key.scope() == scope)
                .cloned(),
        );
    }

    /// Mark one entry stale
    pub fn invalidate(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.invalidated = true;
        }
        if self.in_flight.contains(key) {
            self.outdated.insert(key.clone());
        }
    }

    /// Mark every entry stale
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.invalidated = true;
        }
        self.outdated.extend(self.in_flight.iter().cloned());
    }

    /// Drop one entry
    pub fn remove(&mut self, key: &QueryKey) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop everything (logout)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
        self.outdated.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> QueryCache<u32> {
        QueryCache::new(Duration::from_secs(30))
    }

    #[test]
    fn test_missing_key_is_stale() {
        assert!(cache().is_stale(&QueryKey::Profile));
    }

    #[test]
    fn test_fresh_until_stale_time() {
        let mut c = cache();
        let t0 = Instant::now();
        let key = QueryKey::Feed { page: 1 };
        c.insert_at(key.clone(), 1, t0);
        assert!(!c.is_stale_at(&key, t0 + Duration::from_secs(10)));
        assert!(c.is_stale_at(&key, t0 + Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_stale_time_always_refetches() {
        let mut c = QueryCache::new(Duration::ZERO);
        c.insert(QueryKey::Bookmarks { page: 1 }, 1);
        assert!(c.is_stale(&QueryKey::Bookmarks { page: 1 }));
    }

    #[test]
    fn test_profile_never_stale_by_age() {
        let mut c = cache();
        let t0 = Instant::now();
        c.insert_at(QueryKey::Profile, 1, t0);
        assert!(!c.is_stale_at(&QueryKey::Profile, t0 + Duration::from_secs(86_400)));
        c.invalidate_scope(QueryScope::Profile);
        assert!(c.is_stale(&QueryKey::Profile));
    }

    #[test]
    fn test_invalidate_scope_only_touches_scope() {
        let mut c = cache();
        c.insert(QueryKey::Comments("a".into()), 1);
        c.insert(QueryKey::Comments("b".into()), 2);
        c.insert(QueryKey::Feed { page: 1 }, 3);

        c.invalidate_scope(QueryScope::Comments);

        assert!(c.is_stale(&QueryKey::Comments("a".into())));
        assert!(c.is_stale(&QueryKey::Comments("b".into())));
        assert!(!c.is_stale(&QueryKey::Feed { page: 1 }));
        // Stale data stays visible until the refetch lands
        assert_eq!(c.get(&QueryKey::Comments("a".into())), Some(&1));
    }

    #[test]
    fn test_begin_fetch_dedupes() {
        let mut c = cache();
        let key = QueryKey::User("ann".into());
        assert!(c.begin_fetch(&key));
        assert!(!c.begin_fetch(&key));
        assert!(c.is_fetching(&key));

        c.insert(key.clone(), 7);
        assert!(!c.is_fetching(&key));
        // Fresh now, so no refetch
        assert!(!c.begin_fetch(&key));
    }

    #[test]
    fn test_invalidated_while_in_flight_lands_stale() {
        let mut c = cache();
        let key = QueryKey::Feed { page: 1 };
        c.insert(key.clone(), 1);
        c.invalidate(&key);
        assert!(c.begin_fetch(&key));

        // A write lands before the older request answers
        c.invalidate_scope(QueryScope::Feed);
        assert!(c.insert(key.clone(), 2));
        assert_eq!(c.get(&key), Some(&2));
        assert!(c.is_stale(&key));
        assert!(c.begin_fetch(&key));

        // The follow-up request started after the write, so it is kept
        assert!(!c.insert(key.clone(), 3));
        assert!(!c.is_stale(&key));
    }

    #[test]
    fn test_set_keeps_older_request_outdated() {
        let mut c = cache();
        assert!(c.begin_fetch(&QueryKey::Profile));
        c.invalidate_scope(QueryScope::Profile);
        c.set(QueryKey::Profile, 2);
        assert!(c.is_fetching(&QueryKey::Profile));
        assert!(!c.is_stale(&QueryKey::Profile));

        assert!(c.insert(QueryKey::Profile, 1));
        assert!(c.is_stale(&QueryKey::Profile));
    }

    #[test]
    fn test_invalidating_other_scope_keeps_fetch_fresh() {
        let mut c = cache();
        let key = QueryKey::Comments("p1".into());
        assert!(c.begin_fetch(&key));
        c.invalidate_scope(QueryScope::Bookmarks);
        assert!(!c.insert(key.clone(), 1));
        assert!(!c.is_stale(&key));
    }

    #[test]
    fn test_failed_fetch_can_retry() {
        let mut c = cache();
        let key = QueryKey::Bookmarks { page: 1 };
        assert!(c.begin_fetch(&key));
        c.fail_fetch(&key);
        assert!(c.begin_fetch(&key));
    }

    #[test]
    fn test_invalidate_all_and_clear() {
        let mut c = cache();
        c.insert(QueryKey::MyPosts { page: 1 }, 1);
        c.insert(QueryKey::CurrentUser, 2);
        c.invalidate_all();
        assert!(c.is_stale(&QueryKey::MyPosts { page: 1 }));
        assert!(c.is_stale(&QueryKey::CurrentUser));
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn test_key_scopes() {
        assert_eq!(
            QueryKey::TagPosts {
                tag: "x".into(),
                page: 1
            }
            .scope(),
            QueryScope::PostLists
        );
        assert_eq!(QueryKey::Following("x".into()).scope(), QueryScope::Follows);
    }
}
