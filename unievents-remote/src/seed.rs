//! Sample campus events used to seed the in-memory service.

use chrono::{NaiveDate, NaiveTime};
use unievents_model::{Event, EventId};

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=600&width=1200";

struct Seed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    date: (i32, u32, u32),
    hours: (u32, u32),
    location: &'static str,
    organizer: &'static str,
    department: &'static str,
    categories: &'static [&'static str],
    featured: bool,
    has_map: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "1",
        title: "Annual University Symposium",
        description: "<p>Keynote speakers from across the academic disciplines.</p>\
                      <p>Panel discussions, research presentations and networking.</p>",
        date: (2025, 6, 15),
        hours: (9, 17),
        location: "University Main Auditorium",
        organizer: "Academic Affairs Office",
        department: "Office of the Provost",
        categories: &["Academic", "Conference"],
        featured: true,
        has_map: true,
    },
    Seed {
        id: "2",
        title: "Student Club Fair",
        description: "<p>Meet the student clubs and organizations on campus.</p>\
                      <p>Every club has a booth where you can sign up.</p>",
        date: (2025, 5, 20),
        hours: (11, 15),
        location: "University Quad",
        organizer: "Student Activities Board",
        department: "Student Affairs",
        categories: &["Student Life", "Social"],
        featured: false,
        has_map: true,
    },
    Seed {
        id: "3",
        title: "Faculty Research Showcase",
        description: "<p>Faculty from all departments present current research.</p>\
                      <p>Talk to the researchers about collaboration opportunities.</p>",
        date: (2025, 7, 10),
        hours: (13, 16),
        location: "Science Building, Room 101",
        organizer: "Research Office",
        department: "Academic Affairs",
        categories: &["Academic", "Research"],
        featured: true,
        has_map: false,
    },
    Seed {
        id: "4",
        title: "Alumni Networking Night",
        description: "<p>Connect with alumni from many industries and career paths.</p>\
                      <p>A panel discussion followed by a reception.</p>",
        date: (2025, 6, 25),
        hours: (18, 21),
        location: "University Center Ballroom",
        organizer: "Alumni Relations",
        department: "Development Office",
        categories: &["Networking", "Career"],
        featured: false,
        has_map: true,
    },
    Seed {
        id: "5",
        title: "International Cultural Festival",
        description: "<p>Food, performances and art from around the world.</p>\
                      <p>Continuous performances on the main stage all day.</p>",
        date: (2025, 5, 5),
        hours: (12, 20),
        location: "University Plaza",
        organizer: "International Student Services",
        department: "Student Affairs",
        categories: &["Cultural", "Social"],
        featured: true,
        has_map: true,
    },
    Seed {
        id: "6",
        title: "Graduate Research Symposium",
        description: "<p>Graduate students present their research to peers and faculty.</p>\
                      <p>Posters, talks and a keynote address.</p>",
        date: (2025, 7, 20),
        hours: (10, 16),
        location: "Graduate Studies Building",
        organizer: "Graduate School",
        department: "Academic Affairs",
        categories: &["Academic", "Research"],
        featured: false,
        has_map: false,
    },
];

/// The sample dataset: six published events.
pub fn seed_events() -> Vec<Event> {
    SEEDS.iter().filter_map(Seed::to_event).collect()
}

impl Seed {
    fn to_event(&self) -> Option<Event> {
        Some(Event {
            id: EventId::from(self.id),
            title: self.title.to_string(),
            description: self.description.to_string(),
            date: NaiveDate::from_ymd_opt(self.date.0, self.date.1, self.date.2)?,
            start_time: NaiveTime::from_hms_opt(self.hours.0, 0, 0)?,
            end_time: NaiveTime::from_hms_opt(self.hours.1, 0, 0)?,
            location: self.location.to_string(),
            organizer: self.organizer.to_string(),
            organizer_department: self.department.to_string(),
            categories: self.categories.iter().map(|c| c.to_string()).collect(),
            image: Some(PLACEHOLDER_IMAGE.to_string()),
            featured: self.featured,
            published: true,
            has_map: self.has_map,
        })
    }
}
