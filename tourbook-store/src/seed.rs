use chrono::{DateTime, Duration, Utc};
use tourbook_core::models::NewTour;
use tourbook_core::repository::TourRepository;
use tourbook_core::CoreResult;
use tracing::info;

struct Sample {
    title: &'static str,
    country: &'static str,
    city: &'static str,
    description: &'static str,
    price: f64,
    duration_days: i32,
    max_people: i32,
    available_slots: i32,
    image: &'static str,
    starts_in_days: i64,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Istanbul Highlights",
        country: "Turkey",
        city: "Istanbul",
        description: "The Blue Mosque, Hagia Sophia, Topkapi Palace and the Grand Bazaar: a walk through Byzantine and Ottoman history.",
        price: 450.0,
        duration_days: 3,
        max_people: 15,
        available_slots: 10,
        image: "https://images.unsplash.com/photo-1524231757912-21f4fe3a7200",
        starts_in_days: 7,
    },
    Sample {
        title: "Paris Discovery",
        country: "France",
        city: "Paris",
        description: "The Eiffel Tower, the Louvre, Notre-Dame, a Seine cruise and croissants in authentic cafes.",
        price: 890.0,
        duration_days: 5,
        max_people: 20,
        available_slots: 15,
        image: "https://images.unsplash.com/photo-1502602898657-3e91760cbb34",
        starts_in_days: 14,
    },
    Sample {
        title: "Eternal Rome",
        country: "Italy",
        city: "Rome",
        description: "The Colosseum, the Vatican, the Trevi Fountain and the Pantheon, with Italian cuisine along the way.",
        price: 750.0,
        duration_days: 4,
        max_people: 18,
        available_slots: 12,
        image: "https://images.unsplash.com/photo-1552832230-c0197dd311b5",
        starts_in_days: 10,
    },
    Sample {
        title: "Barcelona and Gaudi",
        country: "Spain",
        city: "Barcelona",
        description: "Sagrada Familia, Park Guell and Casa Batllo, then the Gothic Quarter and Barceloneta beach.",
        price: 680.0,
        duration_days: 4,
        max_people: 16,
        available_slots: 8,
        image: "https://images.unsplash.com/photo-1583422409516-2895a77efded",
        starts_in_days: 12,
    },
    Sample {
        title: "Amsterdam Canals",
        country: "Netherlands",
        city: "Amsterdam",
        description: "A canal cruise, the Van Gogh Museum and the Rijksmuseum, bicycles and tulips.",
        price: 590.0,
        duration_days: 3,
        max_people: 12,
        available_slots: 6,
        image: "https://images.unsplash.com/photo-1512470876302-972faa2aa9a4",
        starts_in_days: 20,
    },
    Sample {
        title: "Golden Prague",
        country: "Czech Republic",
        city: "Prague",
        description: "Old Town, Charles Bridge, Prague Castle and the astronomical clock, plus a Czech beer tasting.",
        price: 420.0,
        duration_days: 3,
        max_people: 20,
        available_slots: 18,
        image: "https://images.unsplash.com/photo-1519677100203-a0e668c92439",
        starts_in_days: 5,
    },
    Sample {
        title: "Vienna, City of Music",
        country: "Austria",
        city: "Vienna",
        description: "Schonbrunn Palace, the State Opera and St. Stephen's Cathedral, with Viennese coffee houses and Sachertorte.",
        price: 720.0,
        duration_days: 4,
        max_people: 14,
        available_slots: 10,
        image: "https://images.unsplash.com/photo-1516550893923-42d28e5677af",
        starts_in_days: 15,
    },
    Sample {
        title: "Classic London",
        country: "United Kingdom",
        city: "London",
        description: "Big Ben, Tower Bridge, Buckingham Palace and the British Museum, with a proper afternoon tea.",
        price: 950.0,
        duration_days: 5,
        max_people: 16,
        available_slots: 12,
        image: "https://images.unsplash.com/photo-1513635269975-59663e0ac1ad",
        starts_in_days: 25,
    },
    Sample {
        title: "Athens and Ancient Greece",
        country: "Greece",
        city: "Athens",
        description: "The Acropolis, the Parthenon, the Ancient Agora and the Acropolis Museum, with dinner over the Aegean.",
        price: 580.0,
        duration_days: 4,
        max_people: 15,
        available_slots: 9,
        image: "https://images.unsplash.com/photo-1555993539-1732b0258235",
        starts_in_days: 18,
    },
    Sample {
        title: "Dubai, City of the Future",
        country: "UAE",
        city: "Dubai",
        description: "Burj Khalifa, Dubai Mall, the Palm islands and a desert safari.",
        price: 1200.0,
        duration_days: 5,
        max_people: 12,
        available_slots: 8,
        image: "https://images.unsplash.com/photo-1512453979798-5ea266f8880c",
        starts_in_days: 30,
    },
];

/// Demo catalogue anchored at `now`; each tour ends `duration_days` after it starts.
pub fn sample_tours(now: DateTime<Utc>) -> Vec<NewTour> {
    SAMPLES
        .iter()
        .map(|s| {
            let start_date = now + Duration::days(s.starts_in_days);
            NewTour {
                title: s.title.to_string(),
                country: s.country.to_string(),
                city: s.city.to_string(),
                description: s.description.to_string(),
                price: s.price,
                duration_days: s.duration_days,
                max_people: s.max_people,
                image_url: Some(s.image.to_string()),
                start_date,
                end_date: start_date + Duration::days(s.duration_days as i64),
                available_slots: s.available_slots,
            }
        })
        .collect()
}

/// Inserts the sample catalogue only into an empty store. Returns how many tours were created.
pub async fn seed_if_empty(repo: &dyn TourRepository) -> CoreResult<usize> {
    let existing = repo.count_tours().await?;
    if existing > 0 {
        info!(existing, "tours already present, skipping seed");
        return Ok(0);
    }

    let tours = sample_tours(Utc::now());
    for tour in &tours {
        repo.create_tour(tour).await?;
    }
    info!(count = tours.len(), "sample tours created");
    Ok(tours.len())
}
