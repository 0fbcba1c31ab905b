/**
 * Feed Routes
 * RSS and sitemap views derived from published blog posts
 */
use axum::{body::Body, http::header, response::Response};
use chrono::{DateTime, Utc};

use crate::config::CONFIG;
use crate::db::{self, models::BlogPost};

/// Most recent posts included in the RSS feed.
const RSS_ITEM_LIMIT: usize = 50;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

fn xml_response(content_type: &'static str, body: String) -> Response {
    Response::builder()
        .status(200)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CACHE_CONTROL,
            "public, max-age=3600, stale-while-revalidate=600",
        )
        .body(Body::from(body))
        .unwrap_or_default()
}

fn unavailable() -> Response {
    Response::builder()
        .status(503)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("Service unavailable"))
        .unwrap_or_default()
}

async fn published_posts() -> Option<Vec<BlogPost>> {
    let store = db::store()?;
    match store.get_published_blog_posts().await {
        Ok(posts) => Some(posts),
        Err(e) => {
            tracing::error!("Database error building feed: {}", e);
            Some(Vec::new())
        }
    }
}

/// GET /api/rss.xml
pub async fn rss_feed() -> Response {
    let Some(posts) = published_posts().await else {
        return unavailable();
    };

    let base_url = &CONFIG.site_url;
    let mut items = String::new();
    for post in posts.iter().take(RSS_ITEM_LIMIT) {
        let post_url = format!("{}/blog/{}", base_url, post.id);
        items.push_str(&format!(
            "    <item>\n\
                   <title>{}</title>\n\
                   <link>{}</link>\n\
                   <description>{}</description>\n\
                   <category>{}</category>\n\
                   <pubDate>{}</pubDate>\n\
                   <guid isPermaLink=\"true\">{}</guid>\n\
                 </item>\n",
            escape_xml(&post.title),
            escape_xml(&post_url),
            escape_xml(&post.excerpt),
            escape_xml(&post.category),
            rfc822(&post.created_at),
            escape_xml(&post_url),
        ));
    }

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}/blog</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}/api/rss.xml" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&CONFIG.site_title),
        escape_xml(base_url),
        escape_xml(&CONFIG.site_description),
        escape_xml(base_url),
        posts
            .first()
            .map(|p| rfc822(&p.created_at))
            .unwrap_or_else(|| rfc822(&Utc::now())),
        items,
    );

    xml_response("application/rss+xml; charset=utf-8", xml)
}

/// GET /api/sitemap.xml
pub async fn sitemap() -> Response {
    let Some(posts) = published_posts().await else {
        return unavailable();
    };

    let base_url = &CONFIG.site_url;
    let now = Utc::now().to_rfc3339();

    let mut urls = String::new();
    for (path, changefreq, priority) in [
        ("", "weekly", "1.0"),
        ("/about", "monthly", "0.8"),
        ("/portfolio", "weekly", "0.9"),
        ("/blog", "weekly", "0.9"),
        ("/contact", "monthly", "0.7"),
    ] {
        urls.push_str(&format!(
            "  <url>\n\
               <loc>{}{}</loc>\n\
               <lastmod>{}</lastmod>\n\
               <changefreq>{}</changefreq>\n\
               <priority>{}</priority>\n\
             </url>\n",
            escape_xml(base_url),
            path,
            now,
            changefreq,
            priority,
        ));
    }

    for post in &posts {
        urls.push_str(&format!(
            "  <url>\n\
               <loc>{}/blog/{}</loc>\n\
               <lastmod>{}</lastmod>\n\
               <changefreq>monthly</changefreq>\n\
               <priority>0.6</priority>\n\
             </url>\n",
            escape_xml(base_url),
            post.id,
            post.updated_at.to_rfc3339(),
        ));
    }

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}</urlset>"#,
        urls,
    );

    xml_response("application/xml; charset=utf-8", xml)
}
