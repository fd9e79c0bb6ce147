//! First-run content: an admin account and a handful of published articles.
//! Article bodies are stored as-is, already in paragraph markup.

use anyhow::{Result, bail};
use tracing::info;

use storynest_api::password::CredentialStore;
use storynest_db::models::ArticleFields;
use storynest_db::{CreateUser, Database};
use storynest_types::models::ArticleStatus;

const ADMIN_USERNAME: &str = "admin";
const ADMIN_EMAIL: &str = "admin@storynest.com";
const ADMIN_PASSWORD: &str = "admin123";

struct Sample {
    title: &'static str,
    category: &'static str,
    date: &'static str,
    content: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "The Art of Mindful Writing",
        category: "Writing Tips",
        date: "2024-03-15",
        content: "<p>Mindful writing brings full attention to the present moment, noticing the thoughts and feelings that arise as each sentence takes shape.</p><p>Slowing down and weighing each word lets writers find deeper layers of meaning in their work.</p><p>Set aside time free from distractions, take a few deep breaths, and notice how you feel before you begin.</p>",
    },
    Sample {
        title: "Building Stories That Resonate",
        category: "Storytelling",
        date: "2024-03-10",
        content: "<p>Memorable stories tap into universal experiences: love, loss, hope and transformation.</p><p>Character development, narrative arc and honest dialogue are the building blocks of a story readers remember.</p><p>Stories drawn from lived observation carry a weight readers can feel.</p>",
    },
    Sample {
        title: "The Digital Age of Literature",
        category: "Culture",
        date: "2024-03-05",
        content: "<p>From e-readers to podcasts to serial fiction, technology keeps changing how stories are made and shared.</p><p>Digital platforms have opened publishing to writers who never had a traditional route.</p><p>Amid the abundance, the challenge is discoverability and depth.</p>",
    },
    Sample {
        title: "Finding Your Author's Voice",
        category: "Personal Growth",
        date: "2024-02-28",
        content: "<p>Voice is the sum of your experiences, your reading and your way of seeing the world.</p><p>Many writers spend years imitating favourite authors before their own voice comes through.</p><p>Voice grows through practice, wide reading and the courage to write what only you can write.</p>",
    },
    Sample {
        title: "The Joy of Handwritten Notes",
        category: "Creativity",
        date: "2024-02-22",
        content: "<p>Putting pen to paper slows us down and deepens our engagement with the material.</p><p>Notes taken by hand tend to be remembered better than typed ones.</p><p>A handwritten journal can be a powerful creative practice.</p>",
    },
    Sample {
        title: "Publishing in the Modern Era",
        category: "Publishing",
        date: "2024-02-15",
        content: "<p>Traditional, self and hybrid publishing now sit side by side, each with its own trade-offs.</p><p>Knowing those trade-offs helps you pick the right path for a given book.</p><p>Align your publishing strategy with what you want from your writing.</p>",
    },
];

/// Creates the admin account if missing, then fills an empty article table.
pub fn seed_if_empty(db: &Database, credentials: &CredentialStore) -> Result<()> {
    let admin_id = match db.get_user_by_username(ADMIN_USERNAME)? {
        Some(row) => row.id,
        None => {
            let hash = credentials.hash(ADMIN_PASSWORD)?;
            match db.create_user(ADMIN_USERNAME, ADMIN_EMAIL, &hash)? {
                CreateUser::Created(id) => {
                    info!("Seeded admin user");
                    id
                }
                CreateUser::UsernameTaken | CreateUser::EmailTaken => {
                    bail!("Cannot seed admin: {} is already registered", ADMIN_EMAIL)
                }
            }
        }
    };

    if db.count_articles()? == 0 {
        for sample in SAMPLES {
            db.insert_article(
                admin_id,
                &ArticleFields {
                    title: sample.title,
                    category: sample.category,
                    date: sample.date,
                    content: sample.content,
                    status: ArticleStatus::Published,
                },
            )?;
        }
        info!("Seeded {} sample articles", SAMPLES.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> CredentialStore {
        CredentialStore::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn seeds_once() {
        let db = Database::open_in_memory().unwrap();
        let creds = cheap();

        seed_if_empty(&db, &creds).unwrap();
        seed_if_empty(&db, &creds).unwrap();

        assert_eq!(db.count_users().unwrap(), 1);
        assert_eq!(db.count_articles().unwrap(), SAMPLES.len() as i64);

        let admin = db.get_user_by_username(ADMIN_USERNAME).unwrap().unwrap();
        assert!(creds.verify(ADMIN_PASSWORD, &admin.password));
    }

    #[test]
    fn seeded_content_is_stored_verbatim() {
        let db = Database::open_in_memory().unwrap();
        seed_if_empty(&db, &cheap()).unwrap();

        let newest = &db.list_published_articles().unwrap()[0];
        assert_eq!(newest.title, SAMPLES[0].title);
        assert_eq!(newest.content, SAMPLES[0].content);
    }
}
