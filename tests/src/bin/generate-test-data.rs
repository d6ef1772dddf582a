use blog_api::{Time, Uuid, ANONYMOUS_AUTHOR};
use chrono::Duration;
use rand::{seq::SliceRandom, Rng};

const NUM_ARTICLES: usize = 20;
const ARTICLE_SECTIONS: usize = 4;
const SECTION_WORD_COUNT: usize = 80;
const CATEGORIES: [&str; 3] = [blog_api::DEFAULT_CATEGORY, "notes", "travel"];

const NUM_COMMENTS: usize = 400;
const COMMENT_WORD_COUNT: usize = 25;
const AUTHORS: [&str; 4] = ["alice", "bob", "carol", ANONYMOUS_AUTHOR];

// Share of comments replying to a comment that never existed
const ORPHAN_RATIO: f64 = 0.05;

fn gen_n_items(table: &str, n: usize, mut f: impl FnMut(usize) -> String) {
    println!("INSERT INTO {} VALUES", table);
    for i in 0..n {
        if i != 0 {
            println!(",");
        }
        print!("    {}", f(i));
    }
    println!();
    println!("ON CONFLICT DO NOTHING;");
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn gen_article_content(rng: &mut impl Rng) -> String {
    let mut res = String::new();
    for _ in 0..rng.gen_range(1..=ARTICLE_SECTIONS) {
        let level = rng.gen_range(1..=3);
        res += &format!("{} {}\n\n", "#".repeat(level), lipsum::lipsum_title());
        res += &lipsum::lipsum_words(SECTION_WORD_COUNT);
        res += "\n\n";
    }
    res
}

fn main() {
    let mut rng = rand::thread_rng();
    let start: Time = chrono::Utc::now() - Duration::days(365);

    // Generate articles, spread over the last year
    let mut articles = Vec::new();
    gen_n_items(
        "articles (id, title, content, category, published, created_at, updated_at)",
        NUM_ARTICLES,
        |_| {
            let id = Uuid::new_v4();
            let created = start + Duration::minutes(rng.gen_range(0..60 * 24 * 300));
            let updated = created + Duration::minutes(rng.gen_range(0..60 * 24 * 30));
            articles.push((id, created));
            format!(
                "('{}', {}, {}, {}, {}, '{}', '{}')",
                id,
                quote(&lipsum::lipsum_title()),
                quote(&gen_article_content(&mut rng)),
                quote(CATEGORIES.choose(&mut rng).unwrap_or(&blog_api::DEFAULT_CATEGORY)),
                rng.gen_bool(0.7),
                created.to_rfc3339(),
                updated.to_rfc3339(),
            )
        },
    );

    // Generate comments in chronological order, so that replies come after their parent
    let mut comments: Vec<(Uuid, Uuid, Time)> = Vec::new();
    gen_n_items(
        "comments (id, article_id, parent_id, content, likes, author, created_at)",
        NUM_COMMENTS,
        |_| {
            let id = Uuid::new_v4();
            let (article, article_created) = articles[rng.gen_range(0..articles.len())];
            let siblings = comments
                .iter()
                .filter(|(_, a, _)| *a == article)
                .collect::<Vec<_>>();
            let parent = match rng.gen_range(0.0..1.0) {
                p if p < ORPHAN_RATIO => Some((Uuid::new_v4(), article_created)),
                p if p < 0.6 => siblings.choose(&mut rng).map(|(id, _, t)| (*id, *t)),
                _ => None,
            };
            let after = parent.map(|(_, t)| t).unwrap_or(article_created);
            let created = after + Duration::minutes(rng.gen_range(1..60 * 24 * 7));
            comments.push((id, article, created));
            format!(
                "('{}', '{}', {}, {}, {}, {}, '{}')",
                id,
                article,
                parent.map_or_else(|| String::from("NULL"), |(p, _)| format!("'{p}'")),
                quote(&lipsum::lipsum_words(rng.gen_range(1..COMMENT_WORD_COUNT))),
                rng.gen_range(0..50),
                quote(AUTHORS.choose(&mut rng).unwrap_or(&ANONYMOUS_AUTHOR)),
                created.to_rfc3339(),
            )
        },
    );
}
