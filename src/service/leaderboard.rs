use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::ambassadormodel::{Ambassador, RankedAmbassador};

pub const PAGE_SIZE: usize = 20;
/// Page links rendered before the ellipsis.
pub const PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Rank,
    Name,
    Handle,
    Country,
    Invites,
    Score,
}

impl SortKey {
    pub fn to_str(&self) -> &str {
        match self {
            SortKey::Rank => "rank",
            SortKey::Name => "name",
            SortKey::Handle => "handle",
            SortKey::Country => "country",
            SortKey::Invites => "invites",
            SortKey::Score => "score",
        }
    }

    fn compare(&self, a: &RankedAmbassador, b: &RankedAmbassador) -> Ordering {
        match self {
            SortKey::Rank => a.rank.cmp(&b.rank),
            SortKey::Name => compare_text(&a.ambassador.name, &b.ambassador.name),
            SortKey::Handle => compare_text(&a.ambassador.handle, &b.ambassador.handle),
            SortKey::Country => compare_text(&a.ambassador.country, &b.ambassador.country),
            SortKey::Invites => a.ambassador.invites.cmp(&b.ambassador.invites),
            SortKey::Score => a.ambassador.score.cmp(&b.ambassador.score),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rank" => Ok(SortKey::Rank),
            "name" => Ok(SortKey::Name),
            "handle" => Ok(SortKey::Handle),
            "country" => Ok(SortKey::Country),
            "invites" => Ok(SortKey::Invites),
            "score" => Ok(SortKey::Score),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_str(&self) -> &str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Same key while ascending flips to descending; anything else starts ascending.
    pub fn toggle(self, key: SortKey) -> SortConfig {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        SortConfig { key, direction }
    }
}

/// Locale-compare stand-in: case-insensitive first, raw text breaks ties.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_rows(rows: &mut [RankedAmbassador], sort: SortConfig) {
    rows.sort_by(|a, b| {
        let ordering = sort.key.compare(a, b);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaderboardFilter {
    pub search: String,
    /// `None` matches every country.
    pub country: Option<String>,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
}

impl LeaderboardFilter {
    /// Normalizes the "all countries" sentinels to `None`.
    pub fn with_country(mut self, country: Option<&str>) -> Self {
        self.country = country
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_string);
        self
    }

    pub fn matches(&self, row: &RankedAmbassador) -> bool {
        let amb = &row.ambassador;

        let query = self.search.trim().to_lowercase();
        let matches_search = query.is_empty()
            || amb.name.to_lowercase().contains(&query)
            || amb.handle.to_lowercase().contains(&query)
            || amb
                .wallet
                .as_deref()
                .is_some_and(|w| w.to_lowercase().contains(&query));

        let matches_country = self
            .country
            .as_deref()
            .map_or(true, |c| amb.country.to_lowercase() == c.to_lowercase());

        let matches_score = self.min_score.map_or(true, |min| amb.score >= min)
            && self.max_score.map_or(true, |max| amb.score <= max);

        matches_search && matches_country && matches_score
    }

    pub fn apply(&self, rows: &[RankedAmbassador]) -> Vec<RankedAmbassador> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub rows: Vec<RankedAmbassador>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total: usize,
    /// 1-based index of the first row shown, 0 when the page is empty.
    pub start: usize,
    pub end: usize,
}

impl Page {
    pub fn summary(&self) -> String {
        format!("Showing {} to {} of {} results", self.start, self.end, self.total)
    }

    /// Leading page numbers to link, plus whether more pages follow them.
    pub fn page_numbers(&self) -> (Vec<usize>, bool) {
        let shown = self.total_pages.min(PAGE_WINDOW);
        ((1..=shown).collect(), self.total_pages > PAGE_WINDOW)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Slices one page. A page past the end (or 0) falls back to page 1.
pub fn paginate(rows: &[RankedAmbassador], requested_page: usize) -> Page {
    let total = rows.len();
    let total_pages = total_pages(total);
    let page = if requested_page == 0 || requested_page > total_pages {
        1
    } else {
        requested_page
    };

    let start_idx = (page - 1) * PAGE_SIZE;
    let end_idx = (start_idx + PAGE_SIZE).min(total);
    let page_rows = rows.get(start_idx..end_idx).unwrap_or_default().to_vec();

    Page {
        start: if page_rows.is_empty() { 0 } else { start_idx + 1 },
        end: end_idx,
        rows: page_rows,
        page,
        page_size: PAGE_SIZE,
        total_pages,
        total,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeaderboardStats {
    pub total_ambassadors: usize,
    pub total_invites: i64,
    pub average_score: i64,
}

pub fn compute_stats(ambassadors: &[Ambassador]) -> LeaderboardStats {
    let total_invites = ambassadors.iter().map(|a| a.invites as i64).sum();
    let total_score: i64 = ambassadors.iter().map(|a| a.score as i64).sum();
    let average_score = if ambassadors.is_empty() {
        0
    } else {
        (total_score as f64 / ambassadors.len() as f64).round() as i64
    };

    LeaderboardStats {
        total_ambassadors: ambassadors.len(),
        total_invites,
        average_score,
    }
}

/// Unique countries, sorted, for the filter dropdown.
pub fn countries(ambassadors: &[Ambassador]) -> Vec<String> {
    ambassadors
        .iter()
        .map(|a| a.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Per-request view state of the leaderboard table.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub filter: LeaderboardFilter,
    pub sort: SortConfig,
    pub page: usize,
    pub expanded: BTreeSet<String>,
}

impl Default for LeaderboardView {
    fn default() -> Self {
        LeaderboardView {
            filter: LeaderboardFilter::default(),
            sort: SortConfig::default(),
            page: 1,
            expanded: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardResult {
    /// Every row passing the filter, in sort order.
    pub rows: Vec<RankedAmbassador>,
    pub page: Page,
}

impl LeaderboardView {
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggle(key);
        self.page = 1;
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn apply(&self, ranked: &[RankedAmbassador]) -> LeaderboardResult {
        let mut rows = self.filter.apply(ranked);
        sort_rows(&mut rows, self.sort);
        let page = paginate(&rows, self.page);
        LeaderboardResult { rows, page }
    }

    /// Query string reproducing this view, used for links on the rendered page.
    pub fn to_query(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if !self.filter.search.is_empty() {
            params.push(("search", self.filter.search.clone()));
        }
        if let Some(country) = &self.filter.country {
            params.push(("country", country.clone()));
        }
        if let Some(min) = self.filter.min_score {
            params.push(("min_score", min.to_string()));
        }
        if let Some(max) = self.filter.max_score {
            params.push(("max_score", max.to_string()));
        }
        params.push(("sort", self.sort.key.to_string()));
        params.push(("direction", self.sort.direction.to_str().to_string()));
        params.push(("page", self.page.to_string()));
        if !self.expanded.is_empty() {
            params.push((
                "expanded",
                self.expanded.iter().cloned().collect::<Vec<_>>().join(","),
            ));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock_data::{generate_mock_ambassadors, sample_ambassador};

    fn ambassador(id: &str, name: &str, country: &str, score: i32) -> Ambassador {
        let mut amb = sample_ambassador(id, &format!("CODE{}", id), score);
        amb.name = name.to_string();
        amb.handle = format!("@{}", name.to_lowercase().replace(' ', ""));
        amb.country = country.to_string();
        amb
    }

    fn ranked_fixture() -> Vec<RankedAmbassador> {
        RankedAmbassador::rank_all(generate_mock_ambassadors())
    }

    #[test]
    fn ranks_by_score_descending() {
        let ranked = RankedAmbassador::rank_all(vec![
            ambassador("1", "Low", "Peru", 10),
            ambassador("2", "High", "Peru", 30),
            ambassador("3", "Mid", "Peru", 20),
        ]);
        let order: Vec<(usize, &str)> = ranked
            .iter()
            .map(|r| (r.rank, r.ambassador.name.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "High"), (2, "Mid"), (3, "Low")]);
        assert!(ranked[2].is_top_three());
    }

    #[test]
    fn country_filter_is_case_insensitive_and_exact() {
        let ranked = ranked_fixture();
        let filter = LeaderboardFilter::default().with_country(Some("canada"));

        let rows = filter.apply(&ranked);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.ambassador.country == "Canada"));
    }

    #[test]
    fn all_sentinel_disables_country_filter() {
        assert_eq!(LeaderboardFilter::default().with_country(Some("all")).country, None);
        assert_eq!(LeaderboardFilter::default().with_country(Some("  ")).country, None);
        assert_eq!(LeaderboardFilter::default().with_country(None).country, None);
    }

    #[test]
    fn score_range_is_inclusive() {
        let ranked = RankedAmbassador::rank_all(vec![
            ambassador("1", "A", "Peru", 100),
            ambassador("2", "B", "Peru", 200),
            ambassador("3", "C", "Peru", 300),
        ]);
        let filter = LeaderboardFilter {
            min_score: Some(100),
            max_score: Some(200),
            ..Default::default()
        };

        let mut scores: Vec<i32> = filter.apply(&ranked).iter().map(|r| r.ambassador.score).collect();
        scores.sort();
        assert_eq!(scores, vec![100, 200]);

        let fixture = ranked_fixture();
        let range = LeaderboardFilter {
            min_score: Some(2000),
            max_score: Some(3000),
            ..Default::default()
        };
        assert!(range
            .apply(&fixture)
            .iter()
            .all(|r| (2000..=3000).contains(&r.ambassador.score)));
    }

    #[test]
    fn search_matches_name_handle_or_wallet() {
        let mut with_wallet = ambassador("3", "Quinn Moore", "Peru", 5);
        with_wallet.wallet = Some("0xDEADBEEF...0001".to_string());
        let ranked = RankedAmbassador::rank_all(vec![
            ambassador("1", "Alex Chen", "Peru", 10),
            ambassador("2", "Riley Smith", "Peru", 20),
            with_wallet,
        ]);

        let by = |q: &str| -> Vec<String> {
            LeaderboardFilter {
                search: q.to_string(),
                ..Default::default()
            }
            .apply(&ranked)
            .into_iter()
            .map(|r| r.ambassador.id)
            .collect()
        };

        assert_eq!(by("ALEX"), vec!["1"]);
        assert_eq!(by("@rileysmith"), vec!["2"]);
        assert_eq!(by("deadbeef"), vec!["3"]);
        assert_eq!(by("").len(), 3);
    }

    #[test]
    fn sort_toggle_flips_only_on_same_key() {
        let start = SortConfig::default();
        assert_eq!(start.key, SortKey::Rank);
        assert_eq!(start.direction, SortDirection::Asc);

        let score = start.toggle(SortKey::Score);
        assert_eq!(score.direction, SortDirection::Asc);

        let score_again = score.toggle(SortKey::Score);
        assert_eq!(score_again.direction, SortDirection::Desc);

        assert_eq!(score_again.toggle(SortKey::Score).direction, SortDirection::Asc);
        assert_eq!(score_again.toggle(SortKey::Name).direction, SortDirection::Asc);
    }

    #[test]
    fn toggling_sort_returns_to_first_page() {
        let mut view = LeaderboardView {
            page: 4,
            ..Default::default()
        };
        view.toggle_sort(SortKey::Invites);
        assert_eq!(view.page, 1);
        assert_eq!(view.sort.key, SortKey::Invites);
    }

    #[test]
    fn numeric_and_text_sorts() {
        let mut rows = RankedAmbassador::rank_all(vec![
            ambassador("1", "bravo", "Peru", 10),
            ambassador("2", "Alpha", "Peru", 30),
            ambassador("3", "charlie", "Peru", 20),
        ]);

        sort_rows(&mut rows, SortConfig { key: SortKey::Name, direction: SortDirection::Asc });
        let names: Vec<&str> = rows.iter().map(|r| r.ambassador.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "bravo", "charlie"]);

        sort_rows(&mut rows, SortConfig { key: SortKey::Score, direction: SortDirection::Desc });
        let scores: Vec<i32> = rows.iter().map(|r| r.ambassador.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);

        sort_rows(&mut rows, SortConfig { key: SortKey::Rank, direction: SortDirection::Asc });
        let ranks: Vec<usize> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn pages_have_expected_lengths_and_concatenate() {
        let ranked = ranked_fixture();
        let total = ranked.len();
        let pages = total_pages(total);
        assert_eq!(pages, 13);

        let mut joined = Vec::new();
        for page in 1..=pages {
            let slice = paginate(&ranked, page);
            assert_eq!(slice.rows.len(), PAGE_SIZE.min(total - (page - 1) * PAGE_SIZE));
            joined.extend(slice.rows);
        }
        assert_eq!(joined, ranked);
    }

    #[test]
    fn page_past_the_end_resets_to_first() {
        let rows: Vec<RankedAmbassador> = ranked_fixture().into_iter().take(25).collect();

        let page = paginate(&rows, 7);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows.len(), 20);

        let last = paginate(&rows, 2);
        assert_eq!(last.rows.len(), 5);
        assert_eq!(last.summary(), "Showing 21 to 25 of 25 results");
        assert!(last.has_previous());
        assert!(!last.has_next());
    }

    #[test]
    fn empty_result_is_a_single_empty_page() {
        let page = paginate(&[], 3);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.rows.is_empty());
        assert_eq!(page.summary(), "Showing 0 to 0 of 0 results");
    }

    #[test]
    fn page_window_caps_at_five() {
        let ranked = ranked_fixture();
        let (numbers, more) = paginate(&ranked, 1).page_numbers();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(more);

        let small: Vec<_> = ranked.into_iter().take(41).collect();
        let (numbers, more) = paginate(&small, 1).page_numbers();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(!more);
    }

    #[test]
    fn filter_change_that_shrinks_results_resets_page() {
        let ranked = ranked_fixture();
        let mut view = LeaderboardView {
            page: 10,
            ..Default::default()
        };
        assert_eq!(view.apply(&ranked).page.page, 10);

        view.filter = LeaderboardFilter::default().with_country(Some("Peru"));
        let result = view.apply(&ranked);
        assert_eq!(result.page.page, 1);
        assert!(result.rows.iter().all(|r| r.ambassador.country == "Peru"));
    }

    #[test]
    fn expanded_rows_toggle() {
        let mut view = LeaderboardView::default();
        view.toggle_expanded("amb-3");
        assert!(view.is_expanded("amb-3"));
        view.toggle_expanded("amb-3");
        assert!(!view.is_expanded("amb-3"));
    }

    #[test]
    fn stats_and_countries() {
        let rows = vec![
            ambassador("1", "A", "Peru", 100),
            ambassador("2", "B", "Chile", 201),
            ambassador("3", "C", "Peru", 300),
        ];
        let stats = compute_stats(&rows);
        assert_eq!(stats.total_ambassadors, 3);
        assert_eq!(stats.total_invites, 10 + 20 + 30);
        assert_eq!(stats.average_score, 200);
        assert_eq!(countries(&rows), vec!["Chile", "Peru"]);

        assert_eq!(compute_stats(&[]).average_score, 0);
    }

    #[test]
    fn query_string_round_trips_view_fields() {
        let mut view = LeaderboardView::default();
        view.filter.search = "alex chen".to_string();
        view.filter = view.filter.clone().with_country(Some("Hong Kong"));
        view.filter.min_score = Some(10);
        view.toggle_sort(SortKey::Score);
        view.toggle_expanded("amb-1");

        assert_eq!(
            view.to_query(),
            "search=alex%20chen&country=Hong%20Kong&min_score=10&sort=score&direction=asc&page=1&expanded=amb-1"
        );
    }
}
