//! Customer list output.

use std::io::{self, Write};

use rubico_app::CustomerApp;
use rubico_core::Customer;

/// Print the current page of `app`'s customer list.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_page(app: &CustomerApp, out: &mut impl Write) -> io::Result<()> {
    let page = app.page();

    if page.is_empty() {
        let message = if app.query().search().is_empty() {
            "No customers yet. Add one with `rubico add`."
        } else {
            "No customers match your search."
        };
        writeln!(out, "{message}")?;
    } else {
        writeln!(out, "Sorted by {}", app.query().sort().label())?;
        writeln!(
            out,
            "{:<36}  {:<24}  {:<28}  {:<18}",
            "ID", "Name", "Email", "Phone"
        )?;
        for customer in &page.items {
            print_row(customer, out)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", page.summary())?;
    if page.total_pages > 1 {
        writeln!(out, "Page {} of {}", page.page, page.total_pages)?;
    }
    Ok(())
}

fn print_row(customer: &Customer, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:<36}  {:<24}  {:<28}  {:<18}",
        customer.id.as_str(),
        customer.full_name,
        customer.email.as_ref().map_or("-", |e| e.as_str()),
        customer.phone.as_ref().map_or("-", |p| p.as_str()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::testing::{app, seeded_app};
    use rubico_app::SortOrder;

    fn render(app: &CustomerApp) -> String {
        let mut out = Vec::new();
        print_page(app, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_empty_list() {
        let mut app = app();
        app.load().await;
        let out = render(&app);
        assert!(out.contains("No customers yet"));
        assert!(out.contains("Showing 0 of 0 customers"));
    }

    #[tokio::test]
    async fn test_sorted_and_searched() {
        let (mut app, _) = seeded_app(&["Meg", "Amy", "Jo"]).await;
        app.set_sort(SortOrder::NameAsc);

        let out = render(&app);
        let amy = out.find("Amy").unwrap();
        let jo = out.find("Jo").unwrap();
        let meg = out.find("Meg").unwrap();
        assert!(amy < jo && jo < meg);
        assert!(out.starts_with("Sorted by Name (A-Z)\n"));
        assert!(out.contains("Showing 3 of 3 customers"));
        assert!(!out.contains("Page "));

        app.set_search("c1@");
        let out = render(&app);
        assert!(out.contains("Amy"));
        assert!(!out.contains("Meg"));
        assert!(out.contains("Showing 1 of 1 customer\n"));

        app.set_search("zzz");
        assert!(render(&app).contains("No customers match your search."));
    }
}
