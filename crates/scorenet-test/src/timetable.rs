//! School timetabling fixtures.

use scorenet_core::PlanningId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lesson {
    pub id: u32,
    pub subject: String,
    pub teacher: String,
    pub room: Option<String>,
    pub timeslot: Option<u32>,
}

impl Lesson {
    pub fn new(id: u32, subject: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            id,
            subject: subject.into(),
            teacher: teacher.into(),
            room: None,
            timeslot: None,
        }
    }

    pub fn scheduled(mut self, room: impl Into<String>, timeslot: u32) -> Self {
        self.room = Some(room.into());
        self.timeslot = Some(timeslot);
        self
    }
}

impl PlanningId for Lesson {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// Unordered pairs of lessons in the same room at the same timeslot.
pub fn room_conflicts(lessons: &[Lesson]) -> i64 {
    count_pairs(lessons, |a, b| {
        a.room.is_some() && a.room == b.room && a.timeslot.is_some() && a.timeslot == b.timeslot
    })
}

/// Unordered pairs of lessons by the same teacher at the same timeslot.
pub fn teacher_conflicts(lessons: &[Lesson]) -> i64 {
    count_pairs(lessons, |a, b| {
        a.teacher == b.teacher && a.timeslot.is_some() && a.timeslot == b.timeslot
    })
}

fn count_pairs(lessons: &[Lesson], conflict: impl Fn(&Lesson, &Lesson) -> bool) -> i64 {
    let mut pairs = 0;
    for (i, a) in lessons.iter().enumerate() {
        for b in &lessons[i + 1..] {
            if conflict(a, b) {
                pairs += 1;
            }
        }
    }
    pairs
}
