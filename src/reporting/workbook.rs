//! Spreadsheet layout for the admin analytics report.
//!
//! One sheet per report section:
//! - Summary: headline counts, tier breakdown and request statuses
//! - Users, Executives, Products, Requests, Packages: one row per record
//! - Referrals: members brought in per executive
//! - Monthly Trends: sign-ups and booked revenue per month

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::reporting::assembler::Report;

struct Formats {
    title: Format,
    header: Format,
    text: Format,
    integer: Format,
    percent: Format,
    money: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x1F3864)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            integer: Format::new()
                .set_num_format("#,##0")
                .set_border(FormatBorder::Thin),
            percent: Format::new()
                .set_num_format("0.00\"%\"")
                .set_border(FormatBorder::Thin),
            money: Format::new()
                .set_num_format("#,##0.00")
                .set_border(FormatBorder::Thin),
        }
    }
}

pub fn file_name(generated_at: DateTime<Utc>) -> String {
    format!("fmc-report-{}.xlsx", generated_at.format("%Y-%m-%d"))
}

/// Sheet names in the order they appear in the workbook.
pub const SHEETS: [&str; 8] = [
    "Summary",
    "Users",
    "Executives",
    "Products",
    "Requests",
    "Packages",
    "Referrals",
    "Monthly Trends",
];

/// Renders `report` into xlsx bytes.
pub fn render(report: &Report) -> Result<Vec<u8>, XlsxError> {
    build(report)?.save_to_buffer()
}

/// Lays out every sheet of `report` without serializing it.
pub fn build(report: &Report) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();

    add_summary_sheet(&mut workbook, report, &formats)?;
    add_users_sheet(&mut workbook, report, &formats)?;
    add_executives_sheet(&mut workbook, report, &formats)?;
    add_products_sheet(&mut workbook, report, &formats)?;
    add_requests_sheet(&mut workbook, report, &formats)?;
    add_packages_sheet(&mut workbook, report, &formats)?;
    add_referrals_sheet(&mut workbook, report, &formats)?;
    add_trends_sheet(&mut workbook, report, &formats)?;

    Ok(workbook)
}

fn write_headers(
    sheet: &mut Worksheet,
    row: u32,
    headers: &[&str],
    formats: &Formats,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_with_format(row, col, *header, &formats.header)?;
        sheet.set_column_width(col, header.len().max(14) as f64)?;
    }
    Ok(())
}

fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn add_summary_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let summary = &report.summary;
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[0])?;

    sheet.write_with_format(0, 0, "Finite Marshall Club report", &formats.title)?;
    sheet.write(1, 0, format!("Generated {}", timestamp(Some(&report.generated_at))))?;

    write_headers(sheet, 3, &["Metric", "Value"], formats)?;
    sheet.set_column_width(0, 28)?;

    let counts = [
        ("Total users", summary.total_users as f64),
        ("Active users", summary.active_users as f64),
        ("Banned users", summary.banned_users as f64),
        ("Revenue (coins)", summary.revenue_coins as f64),
        ("Executives", summary.total_executives as f64),
        ("Active executives", summary.active_executives as f64),
        ("Products", summary.total_products as f64),
        ("Active products", summary.active_products as f64),
        ("Out of stock products", summary.out_of_stock_products as f64),
        ("Requests", summary.total_requests as f64),
        ("Packages", summary.total_packages as f64),
        ("Active packages", summary.active_packages as f64),
    ];

    let mut row = 4;
    for (label, value) in counts {
        sheet.write_with_format(row, 0, label, &formats.text)?;
        sheet.write_with_format(row, 1, value, &formats.integer)?;
        row += 1;
    }
    for (label, value) in [
        ("Active share", summary.active_share),
        ("Banned share", summary.banned_share),
    ] {
        sheet.write_with_format(row, 0, label, &formats.text)?;
        sheet.write_with_format(row, 1, value, &formats.percent)?;
        row += 1;
    }

    row += 1;
    write_headers(sheet, row, &["Tier", "Package ID", "Users", "Share"], formats)?;
    for tier in &summary.tiers {
        row += 1;
        sheet.write_with_format(row, 0, tier.label.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, tier.package_id.as_deref().unwrap_or("unresolved"), &formats.text)?;
        sheet.write_with_format(row, 2, tier.users as f64, &formats.integer)?;
        sheet.write_with_format(row, 3, tier.share, &formats.percent)?;
    }

    row += 2;
    write_headers(sheet, row, &["Request status", "Requests"], formats)?;
    for (status, count) in &summary.requests_by_status {
        row += 1;
        sheet.write_with_format(row, 0, status.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, *count as f64, &formats.integer)?;
    }

    Ok(())
}

fn add_users_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let package_names: HashMap<&str, &str> = report
        .snapshot
        .packages
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[1])?;
    write_headers(
        sheet,
        0,
        &["ID", "Name", "Email", "Phone", "Package", "Active", "Banned", "Referred By", "Coins", "Joined"],
        formats,
    )?;

    for (i, user) in report.snapshot.users.iter().enumerate() {
        let row = i as u32 + 1;
        let package = user
            .package_id
            .as_deref()
            .map(|id| package_names.get(id).copied().unwrap_or(id))
            .unwrap_or("");

        sheet.write_with_format(row, 0, user.id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, user.name.as_str(), &formats.text)?;
        sheet.write_with_format(row, 2, user.email.as_str(), &formats.text)?;
        sheet.write_with_format(row, 3, user.phone.as_deref().unwrap_or(""), &formats.text)?;
        sheet.write_with_format(row, 4, package, &formats.text)?;
        sheet.write_with_format(row, 5, yes_no(user.is_active), &formats.text)?;
        sheet.write_with_format(row, 6, yes_no(user.is_banned), &formats.text)?;
        sheet.write_with_format(row, 7, user.referred_by.as_deref().unwrap_or(""), &formats.text)?;
        sheet.write_with_format(row, 8, user.coins as f64, &formats.integer)?;
        sheet.write_with_format(row, 9, timestamp(user.created_at.as_ref()), &formats.text)?;
    }

    Ok(())
}

fn add_executives_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[2])?;
    write_headers(
        sheet,
        0,
        &["ID", "Name", "Email", "Phone", "Referral Code", "Active", "Joined"],
        formats,
    )?;

    for (i, executive) in report.snapshot.executives.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_with_format(row, 0, executive.id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, executive.name.as_str(), &formats.text)?;
        sheet.write_with_format(row, 2, executive.email.as_str(), &formats.text)?;
        sheet.write_with_format(row, 3, executive.phone.as_deref().unwrap_or(""), &formats.text)?;
        sheet.write_with_format(row, 4, executive.referral_code.as_deref().unwrap_or(""), &formats.text)?;
        sheet.write_with_format(row, 5, yes_no(executive.is_active), &formats.text)?;
        sheet.write_with_format(row, 6, timestamp(executive.created_at.as_ref()), &formats.text)?;
    }

    Ok(())
}

fn add_products_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[3])?;
    write_headers(sheet, 0, &["ID", "Name", "Category", "Coin Cost", "Stock", "Active"], formats)?;

    for (i, product) in report.snapshot.products.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_with_format(row, 0, product.id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, product.name.as_str(), &formats.text)?;
        sheet.write_with_format(row, 2, product.category.as_deref().unwrap_or(""), &formats.text)?;
        sheet.write_with_format(row, 3, product.coin_cost as f64, &formats.integer)?;
        sheet.write_with_format(row, 4, product.stock as f64, &formats.integer)?;
        sheet.write_with_format(row, 5, yes_no(product.is_active), &formats.text)?;
    }

    Ok(())
}

fn add_requests_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[4])?;
    write_headers(
        sheet,
        0,
        &["ID", "User", "Product", "Quantity", "Total Coins", "Status", "Created"],
        formats,
    )?;

    for (i, request) in report.snapshot.requests.iter().enumerate() {
        let row = i as u32 + 1;
        let product = request
            .product_name
            .as_deref()
            .or(request.product_id.as_deref())
            .unwrap_or("");

        sheet.write_with_format(row, 0, request.id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, request.user_id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 2, product, &formats.text)?;
        sheet.write_with_format(row, 3, request.quantity, &formats.integer)?;
        sheet.write_with_format(row, 4, request.total_coins as f64, &formats.integer)?;
        sheet.write_with_format(row, 5, request.status.as_str(), &formats.text)?;
        sheet.write_with_format(row, 6, timestamp(request.created_at.as_ref()), &formats.text)?;
    }

    Ok(())
}

fn add_packages_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[5])?;
    write_headers(
        sheet,
        0,
        &["ID", "Name", "Price", "Coins", "Validity (days)", "Active", "Members"],
        formats,
    )?;

    for (i, package) in report.snapshot.packages.iter().enumerate() {
        let row = i as u32 + 1;
        let members = report
            .snapshot
            .users
            .iter()
            .filter(|user| user.holds_package(&package.id))
            .count();

        sheet.write_with_format(row, 0, package.id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, package.name.as_str(), &formats.text)?;
        sheet.write_with_format(row, 2, package.price, &formats.money)?;
        sheet.write_with_format(row, 3, package.coins as f64, &formats.integer)?;
        match package.validity_days {
            Some(days) => sheet.write_with_format(row, 4, days, &formats.integer)?,
            None => sheet.write_with_format(row, 4, "", &formats.text)?,
        };
        sheet.write_with_format(row, 5, yes_no(package.is_active), &formats.text)?;
        sheet.write_with_format(row, 6, members as f64, &formats.integer)?;
    }

    Ok(())
}

fn add_referrals_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[6])?;
    write_headers(
        sheet,
        0,
        &["Executive ID", "Executive", "Referral Code", "Referred Users", "Active Referred"],
        formats,
    )?;

    for (i, referral) in report.referrals.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_with_format(row, 0, referral.executive_id.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, referral.executive_name.as_str(), &formats.text)?;
        sheet.write_with_format(row, 2, referral.referral_code.as_deref().unwrap_or(""), &formats.text)?;
        sheet.write_with_format(row, 3, referral.referred_users as f64, &formats.integer)?;
        sheet.write_with_format(row, 4, referral.active_referred_users as f64, &formats.integer)?;
    }

    Ok(())
}

fn add_trends_sheet(workbook: &mut Workbook, report: &Report, formats: &Formats) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEETS[7])?;
    write_headers(
        sheet,
        0,
        &["Month", "New Users", "Fulfilled Requests", "Revenue (coins)"],
        formats,
    )?;

    for (i, trend) in report.trends.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_with_format(row, 0, trend.month.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, trend.new_users as f64, &formats.integer)?;
        sheet.write_with_format(row, 2, trend.fulfilled_requests as f64, &formats.integer)?;
        sheet.write_with_format(row, 3, trend.revenue_coins as f64, &formats.integer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::TimeZone;

    use crate::catalog::{Executive, FulfillmentRequest, Member, Package, Product, RequestStatus};
    use crate::reporting::assembler::Snapshot;
    use crate::reporting::summary::Tier;

    #[test]
    fn file_name_carries_generation_date() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap();

        assert_eq!(file_name(at), "fmc-report-2025-12-31.xlsx");
    }

    fn report_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap()
    }

    fn member(id: &str, name: &str) -> Member {
        Member {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            phone: None,
            package_id: Some("p-gold".to_string()),
            is_active: true,
            is_banned: false,
            referred_by: Some("EXEC01".to_string()),
            coins: 120,
            created_at: Some(report_at()),
        }
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            users: vec![member("u1", "Asha"), member("u2", "Ravi"), member("u3", "Meera")],
            executives: vec![Executive {
                id: "e1".to_string(),
                name: "Kiran".to_string(),
                email: "kiran@example.com".to_string(),
                phone: None,
                referral_code: Some("EXEC01".to_string()),
                is_active: true,
                created_at: None,
            }],
            products: vec![
                Product {
                    id: "mug".to_string(),
                    name: "Mug".to_string(),
                    category: Some("Merch".to_string()),
                    coin_cost: 50,
                    stock: 10,
                    is_active: true,
                },
                Product {
                    id: "tee".to_string(),
                    name: "T-shirt".to_string(),
                    category: None,
                    coin_cost: 80,
                    stock: 0,
                    is_active: true,
                },
            ],
            requests: vec![FulfillmentRequest {
                id: "r1".to_string(),
                user_id: "u1".to_string(),
                product_id: Some("mug".to_string()),
                product_name: Some("Mug".to_string()),
                quantity: 1,
                total_coins: 50,
                status: RequestStatus::Delivered,
                created_at: Some(report_at()),
            }],
            packages: vec![Package {
                id: "p-gold".to_string(),
                name: "Gold".to_string(),
                price: 4999.0,
                coins: 500,
                validity_days: Some(365),
                is_active: true,
            }],
        }
    }

    fn read_back(report: &Report) -> Xlsx<Cursor<Vec<u8>>> {
        let bytes = render(report).unwrap();
        open_workbook_from_rs(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn sheets_are_laid_out_in_order() {
        let report = Report::build(Snapshot::default(), &[Tier::labelled("gold", "Gold")], report_at());

        let mut workbook = build(&report).unwrap();
        let names: Vec<String> = workbook.worksheets().iter().map(|sheet| sheet.name()).collect();

        assert_eq!(names, SHEETS);
    }

    #[test]
    fn empty_report_still_renders_every_sheet() {
        let report = Report::build(Snapshot::default(), &[Tier::labelled("gold", "Gold")], report_at());

        let mut workbook = read_back(&report);

        assert_eq!(workbook.sheet_names(), SHEETS);
        let users = workbook.worksheet_range("Users").unwrap();
        assert_eq!(users.height(), 1);
    }

    #[test]
    fn entity_sheets_hold_one_row_per_record() {
        let snapshot = sample_snapshot();
        let report = Report::build(snapshot.clone(), &[Tier::labelled("gold", "Gold")], report_at());

        let mut workbook = read_back(&report);

        let expected = [
            ("Users", snapshot.users.len()),
            ("Executives", snapshot.executives.len()),
            ("Products", snapshot.products.len()),
            ("Requests", snapshot.requests.len()),
            ("Packages", snapshot.packages.len()),
            ("Referrals", report.referrals.len()),
            ("Monthly Trends", report.trends.len()),
        ];
        for (sheet, records) in expected {
            let range = workbook.worksheet_range(sheet).unwrap();
            assert_eq!(range.height(), records + 1, "rows on {}", sheet);
        }
    }

    #[test]
    fn users_sheet_shows_package_name() {
        let report = Report::build(sample_snapshot(), &[], report_at());

        let mut workbook = read_back(&report);
        let users = workbook.worksheet_range("Users").unwrap();

        assert_eq!(users.get_value((0, 1)), Some(&Data::String("Name".to_string())));
        assert_eq!(users.get_value((1, 1)), Some(&Data::String("Asha".to_string())));
        assert_eq!(users.get_value((1, 4)), Some(&Data::String("Gold".to_string())));
    }
}
