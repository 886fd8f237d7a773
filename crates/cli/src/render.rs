//! Plain-text views of books for the terminal.

use std::fmt::Write;

use bookshelf_db::Book;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    Card,
    #[default]
    Table,
}

const DESCRIPTION_PREVIEW: usize = 80;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// "Showing X of Y books", with the search term when one was given
pub fn summary(shown: usize, total: usize, term: Option<&str>) -> String {
    match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => format!("Showing {shown} of {total} books for \"{term}\""),
        None => format!("Showing {shown} of {total} books"),
    }
}

pub fn table(books: &[&Book]) -> String {
    let rows: Vec<[String; 4]> = books
        .iter()
        .enumerate()
        .map(|(i, b)| {
            [
                (i + 1).to_string(),
                b.title.clone(),
                b.author.clone(),
                b.publish_year.to_string(),
            ]
        })
        .collect();

    let header = ["No", "Title", "Author", "Year"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |cells: [&str; 4], ids: &str, out: &mut String| {
        let _ = writeln!(
            out,
            "{:<w0$}  {:<w1$}  {:<w2$}  {:<w3$}  {}",
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            ids,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
    };

    line(header, "ID", &mut out);
    for (row, book) in rows.iter().zip(books) {
        let cells = [row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()];
        line(cells, &book.id.to_string(), &mut out);
    }
    out
}

pub fn cards(books: &[&Book]) -> String {
    let mut out = String::new();
    for book in books {
        let _ = writeln!(out, "+ {} ({})", book.title, book.publish_year);
        let _ = writeln!(out, "  by {}", book.author);
        let _ = writeln!(out, "  {}", truncate(&book.description, DESCRIPTION_PREVIEW));
        if let Some(image) = &book.image_url {
            let _ = writeln!(out, "  cover: {image}");
        }
        let _ = writeln!(out, "  id: {}", book.id);
        out.push('\n');
    }
    out
}

pub fn detail(book: &Book) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "Author:       {}", book.author);
    let _ = writeln!(out, "Published:    {}", book.publish_year);
    let _ = writeln!(out, "Description:  {}", book.description);
    if let Some(image) = &book.image_url {
        let _ = writeln!(out, "Cover:        {image}");
    }
    if let Some(link) = &book.link {
        let _ = writeln!(out, "Link:         {link}");
    }
    let _ = writeln!(out, "Created:      {}", book.created_at.date());
    let _ = writeln!(out, "Updated:      {}", book.updated_at.date());
    let _ = writeln!(out, "ID:           {}", book.id);
    out
}
