use std::collections::{BTreeSet, HashSet, VecDeque};

use anyhow::Result;

use crate::api::{CategoryMember, CategoryMemberSource, NS_ARTICLE, NS_SUBCATEGORY, NS_TALK};

/// The five nested vital-article tiers. Level 1 holds ~10 articles, level 5
/// ~50,000.
pub const VITAL_LEVELS: std::ops::RangeInclusive<u8> = 1..=5;

const TALK_PREFIX_LEN: usize = "Talk:".len();

pub fn vital_level_category(level: u8) -> String {
    format!("Category:Wikipedia_level-{level}_vital_articles")
}

/// Walk every vital-article level category and merge the yielded titles
/// into one deduplicated, lexicographically ordered set. Merge order is
/// irrelevant: the levels are nested supersets and the target set is
/// duplicate-tolerant by construction.
pub fn collect_vital_titles<S: CategoryMemberSource>(source: &mut S) -> Result<BTreeSet<String>> {
    let mut titles = BTreeSet::new();
    for level in VITAL_LEVELS {
        for title in VitalTitleIter::new(source, &vital_level_category(level)) {
            titles.insert(title?);
        }
    }
    Ok(titles)
}

/// Lazy depth-first expansion of one category and its transitive
/// subcategories into article titles.
///
/// Classification per member namespace: subcategory pages are recursed into
/// (pre-order, before remaining siblings of the same page), talk pages are
/// emitted with their fixed `Talk:` prefix stripped, article pages are
/// emitted as-is, anything else is skipped. A category already expanded
/// within this traversal is not entered again, so a cyclic category graph
/// terminates.
///
/// Only the current page of each in-flight category is held in memory; the
/// next page is requested on demand through the continuation cursor. A
/// fetch failure is yielded once as `Err` and ends the iteration.
pub struct VitalTitleIter<'a, S: CategoryMemberSource> {
    source: &'a mut S,
    stack: Vec<Frame>,
    visited: HashSet<String>,
    failed: bool,
}

struct Frame {
    category: String,
    cursor: Option<String>,
    /// Members of the current page not yet classified.
    pending: VecDeque<CategoryMember>,
    /// False until the first page of this category has been fetched; a
    /// frame with no cursor and no pending members is otherwise exhausted.
    fetched: bool,
}

impl Frame {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            cursor: None,
            pending: VecDeque::new(),
            fetched: false,
        }
    }
}

impl<'a, S: CategoryMemberSource> VitalTitleIter<'a, S> {
    pub fn new(source: &'a mut S, root: &str) -> Self {
        let mut visited = HashSet::new();
        visited.insert(root.to_string());
        Self {
            source,
            stack: vec![Frame::new(root)],
            visited,
            failed: false,
        }
    }
}

enum Step {
    Classify(CategoryMember),
    FetchPage,
    PopFrame,
}

impl<S: CategoryMemberSource> Iterator for VitalTitleIter<'_, S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let step = {
                let frame = self.stack.last_mut()?;
                if let Some(member) = frame.pending.pop_front() {
                    Step::Classify(member)
                } else if frame.fetched && frame.cursor.is_none() {
                    Step::PopFrame
                } else {
                    Step::FetchPage
                }
            };

            match step {
                Step::Classify(member) => match member.ns {
                    NS_SUBCATEGORY => {
                        if self.visited.insert(member.title.clone()) {
                            self.stack.push(Frame::new(&member.title));
                        }
                    }
                    NS_TALK => {
                        return Some(Ok(member
                            .title
                            .get(TALK_PREFIX_LEN..)
                            .unwrap_or_default()
                            .to_string()));
                    }
                    NS_ARTICLE => return Some(Ok(member.title)),
                    _ => {}
                },
                Step::PopFrame => {
                    self.stack.pop();
                }
                Step::FetchPage => {
                    let Some(frame) = self.stack.last_mut() else {
                        return None;
                    };
                    match self
                        .source
                        .fetch_page(&frame.category, frame.cursor.as_deref())
                    {
                        Ok(page) => {
                            frame.fetched = true;
                            frame.cursor = page.continuation;
                            frame.pending = page.members.into();
                        }
                        Err(error) => {
                            self.failed = true;
                            return Some(Err(error));
                        }
                    }
                }
            }
        }
    }
}
