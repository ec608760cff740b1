//! Demo content for local runs.

use chrono::{DateTime, NaiveDate, Utc};

use devhub_core::{EmailAddress, RecordId};

use crate::{EditorEntry, Event, Resource};

pub fn demo_events() -> Vec<Event> {
    vec![
        Event {
            id: RecordId::new(1),
            ..Event::draft("Web Development Workshop", "2025-06-15")
                .at("14:00", "Lab 203")
                .describe("Learn the basics of HTML, CSS, and JavaScript.")
        },
        Event {
            id: RecordId::new(2),
            ..Event::draft("Hackathon 2025", "2025-07-10")
                .at("09:00", "Main Hall")
                .describe("24-hour coding competition with amazing prizes.")
        },
        Event {
            id: RecordId::new(3),
            ..Event::draft("AI Study Group", "2025-06-20")
                .at("16:00", "Room 105")
                .describe("Weekly meeting to discuss AI concepts and applications.")
        },
    ]
}

pub fn demo_resources() -> Vec<Resource> {
    vec![
        Resource {
            id: RecordId::new(1),
            ..Resource::draft("JavaScript Fundamentals", "https://javascript.info/")
                .in_category("Web Development")
                .describe("Comprehensive guide to JavaScript")
        },
        Resource {
            id: RecordId::new(2),
            ..Resource::draft("React Documentation", "https://react.dev/")
                .in_category("Web Development")
                .describe("Official React documentation")
        },
        Resource {
            id: RecordId::new(3),
            ..Resource::draft(
                "Python for Data Science",
                "https://www.datacamp.com/courses/intro-to-python-for-data-science",
            )
            .in_category("Data Science")
            .describe("Introduction to Python for data analysis")
        },
    ]
}

pub fn demo_editors() -> Vec<EditorEntry> {
    [("editor1@gmail.com", (2025, 5, 1)), ("editor2@gmail.com", (2025, 5, 15))]
        .into_iter()
        .filter_map(|(email, (y, m, d))| {
            Some(EditorEntry {
                email: EmailAddress::parse(email).ok()?,
                created_at: midnight_utc(y, m, d)?,
            })
        })
        .collect()
}

fn midnight_utc(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentStore, EditorAllowList, Record};

    #[test]
    fn demo_records_are_valid_and_keep_their_ids() {
        for event in demo_events() {
            event.validate().unwrap();
        }
        for resource in demo_resources() {
            resource.validate().unwrap();
        }
        let events = ContentStore::seeded(demo_events());
        assert_eq!(events.next_id(), Some(RecordId::new(4)));
    }

    #[test]
    fn demo_editors_fit_the_default_domain() {
        let mut list = EditorAllowList::default();
        list.seed(demo_editors());
        assert_eq!(list.list().len(), 2);
        assert!(list.contains("editor2@gmail.com"));
    }
}
