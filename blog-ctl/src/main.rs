use anyhow::Context;
use blog_client::{
    api::{Article, ArticleId, CommentId, CommentNode, DEFAULT_CATEGORY},
    ArticleView, Client, Discussion, Outline, ViewError,
};

#[derive(structopt::StructOpt)]
#[structopt(about = "Command line access to a blog server")]
struct Opt {
    /// Base url of the server
    #[structopt(long, env = "BLOG_HOST", default_value = "http://localhost:3000")]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Read and write comments
    Comments(CommentCmd),

    /// Read and write articles
    Articles(ArticleCmd),
}

#[derive(structopt::StructOpt)]
enum CommentCmd {
    /// Print the comment threads of an article
    List {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        article: ArticleId,
    },

    /// Post a comment, or a reply with --reply-to
    Post {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        article: ArticleId,

        content: String,

        #[structopt(long, parse(try_from_str = CommentId::parse))]
        reply_to: Option<CommentId>,

        #[structopt(long)]
        author: Option<String>,
    },

    /// Delete a single comment, its replies are kept
    Delete {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        article: ArticleId,

        #[structopt(parse(try_from_str = CommentId::parse))]
        id: CommentId,
    },

    /// Like a comment
    Like {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        article: ArticleId,

        #[structopt(parse(try_from_str = CommentId::parse))]
        id: CommentId,
    },
}

#[derive(structopt::StructOpt)]
enum ArticleCmd {
    /// List articles, newest first
    List {
        /// Include unpublished articles
        #[structopt(long)]
        all: bool,

        #[structopt(long)]
        category: Option<String>,
    },

    /// Print an article
    Show {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        id: ArticleId,
    },

    /// Create an article, the body is read from a markdown file
    Create {
        title: String,

        #[structopt(long)]
        content_file: Option<std::path::PathBuf>,

        #[structopt(long)]
        category: Option<String>,

        #[structopt(long)]
        published: bool,
    },

    /// Change some fields of an article
    Update {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        id: ArticleId,

        #[structopt(long)]
        title: Option<String>,

        #[structopt(long)]
        content_file: Option<std::path::PathBuf>,

        #[structopt(long)]
        category: Option<String>,
    },

    Publish {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        id: ArticleId,
    },

    Unpublish {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        id: ArticleId,
    },

    Delete {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        id: ArticleId,
    },

    /// Print the table of contents of an article
    Outline {
        #[structopt(parse(try_from_str = ArticleId::parse))]
        id: ArticleId,
    },
}

async fn read_content(path: Option<std::path::PathBuf>) -> anyhow::Result<Option<String>> {
    match path {
        None => Ok(None),
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading article content from {path:?}"))
            .map(Some),
    }
}

fn print_forest(forest: &[CommentNode]) {
    let mut stack = forest.iter().rev().map(|n| (0, n)).collect::<Vec<_>>();
    while let Some((depth, n)) = stack.pop() {
        let c = &n.comment;
        println!(
            "{:indent$}- {} by {} at {} ({} likes)",
            "",
            c.id.0,
            c.author,
            c.created_at,
            c.likes,
            indent = depth * 2
        );
        for line in c.content.lines() {
            println!("{:indent$}  {line}", "", indent = depth * 2);
        }
        stack.extend(n.replies.iter().rev().map(|r| (depth + 1, r)));
    }
}

fn print_article_line(a: &Article) {
    let status = match a.published {
        true => "published",
        false => "draft",
    };
    println!(
        "{}  [{}] {} ({status}, {})",
        a.id.0, a.category, a.title, a.created_at
    );
}

fn print_view(view: &ArticleView) {
    if let Some(a) = view.article() {
        print_article_line(a);
    }
}

async fn load_discussion(client: &Client, article: ArticleId) -> anyhow::Result<Discussion> {
    let mut d = Discussion::new(article);
    d.load(client.list_messages(article).await?);
    Ok(d)
}

async fn run_comments(client: &Client, cmd: CommentCmd) -> anyhow::Result<()> {
    match cmd {
        CommentCmd::List { article } => {
            let d = load_discussion(client, article).await?;
            if d.is_empty() {
                println!("no comments");
            }
            print_forest(d.forest());
        }
        CommentCmd::Post {
            article,
            content,
            reply_to,
            author,
        } => {
            let mut d = load_discussion(client, article).await?;
            d.reply_to(reply_to)?;
            let c = client
                .create_message(&d.submission(&content, author)?)
                .await?;
            println!("{}", c.id.0);
            d.created(c)?;
            print_forest(d.forest());
        }
        CommentCmd::Delete { article, id } => {
            let mut d = load_discussion(client, article).await?;
            d.find(&id).ok_or(ViewError::UnknownComment(id))?;
            client.delete_message(id).await?;
            d.deleted(id)?;
            print_forest(d.forest());
        }
        CommentCmd::Like { article, id } => {
            let mut d = load_discussion(client, article).await?;
            d.find(&id).ok_or(ViewError::UnknownComment(id))?;
            let likes = client.like_message(id).await?;
            d.liked(id, likes)?;
            println!("{likes}");
        }
    }
    Ok(())
}

async fn load_article(client: &Client, id: ArticleId) -> anyhow::Result<ArticleView> {
    let mut view = ArticleView::new();
    view.loaded(client.fetch_article(id).await?)?;
    Ok(view)
}

async fn set_published(
    client: &Client,
    view: &mut ArticleView,
    published: bool,
) -> anyhow::Result<()> {
    let id = view.article().map(|a| a.id).ok_or(ViewError::NoArticle)?;
    client.publish_article(id, published).await?;
    view.published(id, published)?;
    Ok(())
}

async fn run_articles(client: &Client, cmd: ArticleCmd) -> anyhow::Result<()> {
    match cmd {
        ArticleCmd::List { all, category } => {
            let articles = match all {
                true => client.list_all_articles(category.as_deref()).await?,
                false => client.list_articles(category.as_deref()).await?,
            };
            for a in &articles {
                print_article_line(a);
            }
        }
        ArticleCmd::Show { id } => {
            let a = client.fetch_article(id).await?;
            print_article_line(&a);
            println!("\n{}", a.content);
        }
        ArticleCmd::Create {
            title,
            content_file,
            category,
            published,
        } => {
            let mut view = ArticleView::new();
            let session = view.begin_new(category.as_deref().unwrap_or(DEFAULT_CATEGORY))?;
            session.set_title(title);
            session.set_content(read_content(content_file).await?.unwrap_or_default());
            let created = client.save(&view.save_request()?).await?;
            view.saved(created)?;
            if published {
                set_published(client, &mut view, true).await?;
            }
            if let Some(a) = view.article() {
                println!("{}", a.id.0);
            }
        }
        ArticleCmd::Update {
            id,
            title,
            content_file,
            category,
        } => {
            let mut view = load_article(client, id).await?;
            let content = read_content(content_file).await?;
            let session = view.begin_edit()?;
            if let Some(title) = title {
                session.set_title(title);
            }
            if let Some(content) = content {
                session.set_content(content);
            }
            if let Some(category) = category {
                session.set_category(category);
            }
            let updated = client.save(&view.save_request()?).await?;
            view.saved(updated)?;
            print_view(&view);
        }
        ArticleCmd::Publish { id } => {
            let mut view = load_article(client, id).await?;
            set_published(client, &mut view, true).await?;
            print_view(&view);
        }
        ArticleCmd::Unpublish { id } => {
            let mut view = load_article(client, id).await?;
            set_published(client, &mut view, false).await?;
            print_view(&view);
        }
        ArticleCmd::Delete { id } => {
            client.delete_article(id).await?;
        }
        ArticleCmd::Outline { id } => {
            let a = client.fetch_article(id).await?;
            for h in Outline::from_markdown(&a.content).headings() {
                let indent = (h.indent_px() / 10) as usize;
                println!("{:indent$}{} #{}", "", h.text, h.id);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let client = Client::new(opt.host);
    match opt.cmd {
        Command::Comments(cmd) => run_comments(&client, cmd).await,
        Command::Articles(cmd) => run_articles(&client, cmd).await,
    }
}
