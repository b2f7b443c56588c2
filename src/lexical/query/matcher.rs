//! Document iterators produced by queries.

/// Walks matching segment-local documents in ascending order.
///
/// A matcher is positioned on its first match as soon as it is created;
/// [`Matcher::doc_id`] returns `None` once it is exhausted.
pub trait Matcher: Send {
    fn doc_id(&self) -> Option<u32>;

    /// Move to the next match.
    fn next(&mut self) -> Option<u32>;

    /// Move to the first match at or after `target`. Never moves backwards.
    fn advance(&mut self, target: u32) -> Option<u32> {
        loop {
            match self.doc_id() {
                Some(doc) if doc >= target => return Some(doc),
                Some(_) => {
                    self.next();
                }
                None => return None,
            }
        }
    }

    /// Score of the current document.
    fn score(&self) -> f32;
}

/// Matches nothing.
#[derive(Debug, Default)]
pub struct EmptyMatcher;

impl Matcher for EmptyMatcher {
    fn doc_id(&self) -> Option<u32> {
        None
    }

    fn next(&mut self) -> Option<u32> {
        None
    }

    fn score(&self) -> f32 {
        0.0
    }
}

/// Matches every document of a segment with a constant score.
#[derive(Debug)]
pub struct AllMatcher {
    doc_count: u32,
    current: u32,
    score: f32,
}

impl AllMatcher {
    pub fn new(doc_count: u32, score: f32) -> Self {
        AllMatcher {
            doc_count,
            current: 0,
            score,
        }
    }
}

impl Matcher for AllMatcher {
    fn doc_id(&self) -> Option<u32> {
        (self.current < self.doc_count).then_some(self.current)
    }

    fn next(&mut self) -> Option<u32> {
        self.current = self.current.saturating_add(1).min(self.doc_count);
        self.doc_id()
    }

    fn advance(&mut self, target: u32) -> Option<u32> {
        self.current = self.current.max(target).min(self.doc_count);
        self.doc_id()
    }

    fn score(&self) -> f32 {
        self.score
    }
}

/// Intersection of several matchers.
///
/// Only sub-matchers flagged as scoring contribute to the score; the others
/// act as pure filters.
pub struct ConjunctionMatcher<'a> {
    subs: Vec<(Box<dyn Matcher + 'a>, bool)>,
    current: Option<u32>,
}

impl<'a> ConjunctionMatcher<'a> {
    pub fn new(subs: Vec<(Box<dyn Matcher + 'a>, bool)>) -> Self {
        let mut matcher = ConjunctionMatcher {
            subs,
            current: None,
        };
        matcher.current = if matcher.subs.is_empty() {
            None
        } else {
            matcher.align()
        };
        matcher
    }

    /// Leapfrog the sub-matchers until they agree on a document.
    fn align(&mut self) -> Option<u32> {
        let mut target = 0;
        for (sub, _) in &self.subs {
            target = target.max(sub.doc_id()?);
        }
        loop {
            let mut agreed = true;
            for (sub, _) in &mut self.subs {
                let doc = sub.advance(target)?;
                if doc > target {
                    target = doc;
                    agreed = false;
                }
            }
            if agreed {
                return Some(target);
            }
        }
    }
}

impl Matcher for ConjunctionMatcher<'_> {
    fn doc_id(&self) -> Option<u32> {
        self.current
    }

    fn next(&mut self) -> Option<u32> {
        let doc = self.current?;
        self.advance(doc + 1)
    }

    fn advance(&mut self, target: u32) -> Option<u32> {
        let doc = self.current?;
        if doc >= target {
            return Some(doc);
        }
        let lead_moved = match self.subs.first_mut() {
            Some((lead, _)) => lead.advance(target).is_some(),
            None => false,
        };
        self.current = if lead_moved { self.align() } else { None };
        self.current
    }

    fn score(&self) -> f32 {
        self.subs
            .iter()
            .filter(|(_, scoring)| *scoring)
            .map(|(sub, _)| sub.score())
            .sum()
    }
}
