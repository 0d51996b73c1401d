//! Workbook fixtures shared by the reader and pipeline tests.

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

pub(crate) const HEADERS: [&str; 9] = [
    "Name",
    "Email Address",
    "Role",
    "Department",
    "Phone Number",
    "Is Part Time",
    "End Of Probation",
    "Start Date",
    "Salary",
];

/// Two sheets, "Staff" then "Contractors", one employee each.
///
/// Phone numbers are numeric cells, start dates are date-formatted serials.
pub(crate) fn roster_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date = Format::new().set_num_format("yyyy-mm-dd");

    let staff = workbook.add_worksheet().set_name("Staff").unwrap();
    let ada = ("Ada Lovelace", "ada@x.com", "Engineer", "R&D");
    write_row(staff, &date, ada, 5550100.0, (2024, 1, 15), 52000.5);

    let contractors = workbook.add_worksheet().set_name("Contractors").unwrap();
    let grace = ("Grace Hopper", "grace@x.com", "Admiral", "Navy");
    write_row(contractors, &date, grace, 5550101.0, (2023, 6, 1), 61000.0);

    workbook.save_to_buffer().unwrap()
}

fn write_row(
    sheet: &mut Worksheet,
    date: &Format,
    (name, email, role, department): (&str, &str, &str, &str),
    phone: f64,
    (year, month, day): (u16, u8, u8),
    salary: f64,
) {
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, name).unwrap();
    sheet.write_string(1, 1, email).unwrap();
    sheet.write_string(1, 2, role).unwrap();
    sheet.write_string(1, 3, department).unwrap();
    sheet.write_number(1, 4, phone).unwrap();
    sheet.write_string(1, 5, "No").unwrap();
    sheet.write_string(1, 6, "Yes").unwrap();
    let start = ExcelDateTime::from_ymd(year, month, day).unwrap();
    sheet.write_datetime_with_format(1, 7, &start, date).unwrap();
    sheet.write_number(1, 8, salary).unwrap();
}
