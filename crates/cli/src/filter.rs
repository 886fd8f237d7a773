use bookshelf_db::Book;

/// Case-insensitive substring match over title, author and description.
/// A blank term keeps every book.
pub fn filter_books<'a>(books: &'a [Book], term: &str) -> Vec<&'a Book> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return books.iter().collect();
    }

    books
        .iter()
        .filter(|book| {
            [&book.title, &book.author, &book.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
