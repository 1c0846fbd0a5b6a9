//! Partitions ungrouped signups into `(date preference, vibe)` buckets and
//! greedily packs each bucket into bounded groups, mixing primary sections
//! where the pool allows it. Pure planning: persistence is the caller's job.

use std::collections::{HashSet, VecDeque};

use crate::signups::repo::Signup;

/// Groups below this floor are never emitted; their members wait for a later
/// run instead of forming a micro-group.
pub const MIN_GROUP_SIZE: usize = 3;

/// A signup as the packer sees it: identity, display contact, and the interest
/// label used as the diversity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub email: Option<String>,
    pub primary_section: String,
}

#[derive(Debug)]
pub struct Bucket {
    pub date_preference: String,
    pub vibe: String,
    pub pool: VecDeque<Member>,
}

#[derive(Debug)]
pub struct PlannedGroup {
    pub date_preference: String,
    pub vibe: String,
    pub members: Vec<Member>,
}

impl PlannedGroup {
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    /// Member emails joined for display; blank contacts are dropped.
    pub fn member_emails(&self) -> String {
        self.members
            .iter()
            .filter_map(|m| m.email.as_deref())
            .filter(|e| !e.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// First non-empty comma-separated token, or `"Unknown"`.
pub fn primary_section(sections: Option<&str>) -> String {
    sections
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .find(|part| !part.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

fn label(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Partition signups into `(date preference, vibe)` buckets. Every signup
/// lands in exactly one bucket; buckets keep first-seen order and pools keep
/// arrival order.
pub fn bucket_signups(signups: &[Signup]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for signup in signups {
        let date_preference = label(signup.date_preference.as_deref(), "Unspecified");
        let vibe = label(signup.coffee_personality.as_deref(), "Any");
        let member = Member {
            id: signup.id.clone(),
            email: signup.email.clone(),
            primary_section: primary_section(signup.sections.as_deref()),
        };
        match buckets
            .iter_mut()
            .find(|b| b.date_preference == date_preference && b.vibe == vibe)
        {
            Some(bucket) => bucket.pool.push_back(member),
            None => buckets.push(Bucket {
                date_preference,
                vibe,
                pool: VecDeque::from([member]),
            }),
        }
    }
    buckets
}

/// Carve one group out of the pool: a diversity pass over distinct primary
/// sections first, then a FIFO fill. Returns `None` with the pool restored
/// when the result would be under the size floor; the caller must then stop
/// packing this bucket.
fn next_group(pool: &mut VecDeque<Member>, group_size: usize) -> Option<Vec<Member>> {
    let mut group: Vec<Member> = Vec::with_capacity(group_size);
    let mut used_sections: HashSet<String> = HashSet::new();

    let mut index = 0;
    while index < pool.len() && group.len() < group_size {
        if used_sections.contains(&pool[index].primary_section) {
            index += 1;
            continue;
        }
        let member = pool.remove(index).expect("index is within the pool");
        used_sections.insert(member.primary_section.clone());
        group.push(member);
    }

    while group.len() < group_size {
        match pool.pop_front() {
            Some(member) => group.push(member),
            None => break,
        }
    }

    if group.len() < MIN_GROUP_SIZE {
        for member in group.into_iter().rev() {
            pool.push_front(member);
        }
        return None;
    }
    Some(group)
}

/// The whole planning step: bucket, then pack each bucket until its pool runs
/// dry or the size floor stops it. Leftover members simply stay ungrouped and
/// are fetched again by the next run.
pub fn plan_groups(signups: &[Signup], group_size: usize) -> Vec<PlannedGroup> {
    let mut planned = Vec::new();
    for mut bucket in bucket_signups(signups) {
        while let Some(members) = next_group(&mut bucket.pool, group_size) {
            planned.push(PlannedGroup {
                date_preference: bucket.date_preference.clone(),
                vibe: bucket.vibe.clone(),
                members,
            });
        }
    }
    planned
}
