//! Site placement by rejection sampling

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::VoronoiIndex;
use crate::error::Result;
use crate::geometry::{distance, Rect};

/// Accepts or rejects a candidate site on its own merits
pub type CandidateFilter<'a> = Box<dyn Fn(IVec2) -> bool + 'a>;

/// Accepts or rejects a candidate site (first argument) against one
/// previously accepted site (second argument)
pub type SiteFilter<'a> = Box<dyn Fn(IVec2, IVec2) -> bool + 'a>;

/// Collects Voronoi sites under a set of filters
///
/// A candidate is accepted only if it lies inside the bounds, does not
/// duplicate an existing site, passes every candidate filter and passes
/// every site filter against every accepted site. Candidate filters run
/// first as they are usually cheaper.
///
/// # Example
///
/// ```
/// use rust_voronoi_city::{Rect, SiteBuilder};
/// use glam::IVec2;
///
/// let mut builder = SiteBuilder::new(Rect::new(IVec2::ZERO, IVec2::new(100, 100)), 7);
/// builder.add_site_filter(SiteBuilder::min_distance(10.0));
///
/// assert_eq!(builder.add_site(IVec2::new(50, 50)), Some(0));
/// assert_eq!(builder.add_site(IVec2::new(52, 50)), None);
///
/// let index = builder.build().unwrap();
/// assert_eq!(index.len(), 1);
/// ```
pub struct SiteBuilder<'a> {
    bounds: Rect,
    sites: Vec<IVec2>,
    rng: ChaCha8Rng,
    candidate_filters: Vec<CandidateFilter<'a>>,
    site_filters: Vec<SiteFilter<'a>>,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(bounds: Rect, seed: u64) -> Self {
        Self {
            bounds,
            sites: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            candidate_filters: Vec::new(),
            site_filters: Vec::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn sites(&self) -> &[IVec2] {
        &self.sites
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn add_candidate_filter(&mut self, filter: impl Fn(IVec2) -> bool + 'a) {
        self.candidate_filters.push(Box::new(filter));
    }

    pub fn add_site_filter(&mut self, filter: impl Fn(IVec2, IVec2) -> bool + 'a) {
        self.site_filters.push(Box::new(filter));
    }

    /// Drop every filter
    pub fn clear_filters(&mut self) {
        self.candidate_filters.clear();
        self.site_filters.clear();
    }

    /// Site filter requiring at least `dist` between sites
    pub fn min_distance(dist: f64) -> impl Fn(IVec2, IVec2) -> bool {
        move |candidate, site| distance(candidate, site) >= dist
    }

    /// Whether `p` would be accepted as the next site
    pub fn accepts(&self, p: IVec2) -> bool {
        if !self.bounds.contains(p) || self.sites.contains(&p) {
            return false;
        }
        if !self.candidate_filters.iter().all(|f| f(p)) {
            return false;
        }
        self.sites
            .iter()
            .all(|&s| self.site_filters.iter().all(|f| f(p, s)))
    }

    /// Add `p` if the filters accept it, returning its id
    pub fn add_site(&mut self, p: IVec2) -> Option<usize> {
        if !self.accepts(p) {
            return None;
        }
        self.sites.push(p);
        Some(self.sites.len() - 1)
    }

    /// Try one uniformly random point in the bounds
    pub fn add_random_site(&mut self) -> Option<(usize, IVec2)> {
        if self.bounds.is_empty() {
            return None;
        }
        let p = IVec2::new(
            self.rng.gen_range(self.bounds.min.x..self.bounds.max.x),
            self.rng.gen_range(self.bounds.min.y..self.bounds.max.y),
        );
        self.add_site(p).map(|id| (id, p))
    }

    /// Compute the Voronoi index of the accepted sites
    ///
    /// # Errors
    ///
    /// Returns `NoSites` if nothing was accepted
    pub fn build(&self) -> Result<VoronoiIndex> {
        VoronoiIndex::build(self.bounds, &self.sites)
    }
}
