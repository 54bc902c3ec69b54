use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use diesel::prelude::*;
use diesel::PgConnection;
use shared::validate::normalize_phone;
use shared::{estimate_from_input, CreateCustomer, CreateVendor, PanelType, PartnerRole, Validate, WorkflowStep};

mod schema {
    diesel::table! {
        customers (id) {
            id -> Int4,
            name -> Varchar,
            phone -> Varchar,
            email -> Nullable<Varchar>,
            address -> Text,
            district -> Varchar,
            state -> Varchar,
            consumer_number -> Nullable<Varchar>,
            discom -> Nullable<Varchar>,
            proposed_capacity_kw -> Nullable<Float8>,
            panel_type -> Nullable<Varchar>,
            partner_code -> Nullable<Varchar>,
            current_step -> Int4,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        vendors (id) {
            id -> Int4,
            name -> Varchar,
            contact_person -> Nullable<Varchar>,
            phone -> Varchar,
            email -> Nullable<Varchar>,
            gstin -> Nullable<Varchar>,
            address -> Nullable<Text>,
            archived -> Bool,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        partners (id) {
            id -> Int4,
            code -> Varchar,
            name -> Varchar,
            role -> Varchar,
            phone -> Varchar,
            district -> Nullable<Varchar>,
            parent_id -> Nullable<Int4>,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        workflow_events (id) {
            id -> Int4,
            customer_id -> Int4,
            step -> Int4,
            changed_by_id -> Int4,
            changed_at -> Timestamptz,
            comment -> Nullable<Text>,
        }
    }

    diesel::allow_tables_to_appear_in_same_query!(customers, partners, vendors, workflow_events);
}

use schema::*;

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser)]
#[command(name = "solar-admin-cli")]
#[command(about = "Admin CLI for the Surya Ghar subsidy tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an installation vendor
    CreateVendor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        contact_person: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// 15-character GST identification number
        #[arg(long)]
        gstin: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// List vendors
    ListVendors {
        #[arg(long, default_value_t = false)]
        include_archived: bool,
    },
    /// Add a BDP, DDP or customer partner
    CreatePartner {
        /// Unique partner code, e.g. "BDP-NSK-01"
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        /// bdp, ddp or customer_partner
        #[arg(long)]
        role: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        district: Option<String>,
        /// Code of the partner this one reports to
        #[arg(long)]
        parent: Option<String>,
    },
    /// List partners
    ListPartners {
        #[arg(long)]
        role: Option<String>,
    },
    /// List customers with their workflow step
    ListCustomers {
        #[arg(long)]
        district: Option<String>,
        /// Only customers on this step number
        #[arg(long)]
        step: Option<i32>,
    },
    /// Import customers from a CSV file
    ImportCustomers {
        #[arg(long)]
        file: PathBuf,
        /// User id recorded on the registration events
        #[arg(long, default_value_t = 0)]
        actor_id: i32,
        /// Dry run - parse and validate without writing to the database
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print a subsidy and EMI estimate
    Estimate {
        #[arg(long)]
        capacity_kw: String,
        /// dcr or non_dcr
        #[arg(long, default_value = "dcr")]
        panel_type: String,
    },
}

// ============================================================================
// Models
// ============================================================================

#[derive(Insertable)]
#[diesel(table_name = vendors)]
struct NewVendor {
    name: String,
    contact_person: Option<String>,
    phone: String,
    email: Option<String>,
    gstin: Option<String>,
    address: Option<String>,
}

#[derive(Queryable)]
#[allow(dead_code)]
struct Vendor {
    id: i32,
    name: String,
    contact_person: Option<String>,
    phone: String,
    email: Option<String>,
    gstin: Option<String>,
    address: Option<String>,
    archived: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = partners)]
struct NewPartner {
    code: String,
    name: String,
    role: String,
    phone: String,
    district: Option<String>,
    parent_id: Option<i32>,
}

#[derive(Queryable)]
#[allow(dead_code)]
struct Partner {
    id: i32,
    code: String,
    name: String,
    role: String,
    phone: String,
    district: Option<String>,
    parent_id: Option<i32>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = customers)]
struct NewCustomer {
    name: String,
    phone: String,
    email: Option<String>,
    address: String,
    district: String,
    state: String,
    consumer_number: Option<String>,
    discom: Option<String>,
    proposed_capacity_kw: Option<f64>,
    panel_type: Option<String>,
    partner_code: Option<String>,
    current_step: i32,
}

#[derive(Insertable)]
#[diesel(table_name = workflow_events)]
struct NewWorkflowEvent {
    customer_id: i32,
    step: i32,
    changed_by_id: i32,
    comment: Option<String>,
}

// ============================================================================
// CSV row
// ============================================================================

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Phone")]
    phone: String,
    #[serde(rename = "Email", default)]
    email: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "District")]
    district: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Consumer Number", default)]
    consumer_number: String,
    #[serde(rename = "DISCOM", default)]
    discom: String,
    #[serde(rename = "Capacity (kW)", default)]
    capacity_kw: String,
    #[serde(rename = "Panel Type", default)]
    panel_type: String,
    #[serde(rename = "Partner Code", default)]
    partner_code: String,
}

fn blank_to_none(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Accepts the labels people type in spreadsheets as well as the stored keys.
fn parse_panel_type(s: &str) -> anyhow::Result<PanelType> {
    match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
        "dcr" => Ok(PanelType::Dcr),
        "non_dcr" | "nondcr" => Ok(PanelType::NonDcr),
        other => anyhow::bail!("Unknown panel type: '{}' (expected dcr or non_dcr)", other),
    }
}

fn parse_partner_role(s: &str) -> anyhow::Result<PartnerRole> {
    PartnerRole::from_key(s.trim().to_lowercase().as_str()).with_context(|| {
        format!(
            "Unknown partner role: '{}' (expected bdp, ddp or customer_partner)",
            s
        )
    })
}

impl CsvRow {
    fn to_request(&self) -> anyhow::Result<CreateCustomer> {
        let proposed_capacity_kw = match blank_to_none(&self.capacity_kw) {
            Some(kw) => Some(
                kw.parse::<f64>()
                    .with_context(|| format!("Capacity '{}' is not a number", kw))?,
            ),
            None => None,
        };
        let panel_type = match blank_to_none(&self.panel_type) {
            Some(p) => Some(parse_panel_type(&p)?),
            None => None,
        };
        let req = CreateCustomer {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: blank_to_none(&self.email),
            address: self.address.trim().to_string(),
            district: self.district.trim().to_string(),
            state: self.state.trim().to_string(),
            consumer_number: blank_to_none(&self.consumer_number),
            discom: blank_to_none(&self.discom),
            proposed_capacity_kw,
            panel_type,
            partner_code: blank_to_none(&self.partner_code).map(|c| c.to_uppercase()),
        };
        req.validate()?;
        Ok(req)
    }
}

fn new_customer(req: CreateCustomer) -> NewCustomer {
    NewCustomer {
        phone: normalize_phone(&req.phone).unwrap_or(req.phone),
        name: req.name,
        email: req.email,
        address: req.address,
        district: req.district,
        state: req.state,
        consumer_number: req.consumer_number,
        discom: req.discom,
        proposed_capacity_kw: req.proposed_capacity_kw,
        panel_type: req.panel_type.map(|p| p.key().to_string()),
        partner_code: req.partner_code,
        current_step: WorkflowStep::Registration.number(),
    }
}

// ============================================================================
// Import logic
// ============================================================================

fn import_customers(file: PathBuf, actor_id: i32, dry_run: bool) -> anyhow::Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(&file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let mut requests: Vec<CreateCustomer> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut seen_phones: HashSet<String> = HashSet::new();

    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                errors.push(format!("Line {}: {}", line, e));
                continue;
            }
        };
        if row.name.trim().is_empty() && row.phone.trim().is_empty() {
            continue;
        }
        match row.to_request() {
            Ok(req) => {
                let phone = normalize_phone(&req.phone).unwrap_or_else(|| req.phone.clone());
                if !seen_phones.insert(phone.clone()) {
                    errors.push(format!("Line {}: phone {} appears twice in the file", line, phone));
                    continue;
                }
                requests.push(req);
            }
            Err(e) => errors.push(format!("Line {}: {}", line, e)),
        }
    }

    if !errors.is_empty() {
        println!("\nValidation errors:");
        for e in &errors {
            println!("  ERROR: {}", e);
        }
        anyhow::bail!("{} validation error(s) found", errors.len());
    }

    if requests.is_empty() {
        println!("No customers found in CSV.");
        return Ok(());
    }

    println!("Parsed {} customers. All rows validated successfully.", requests.len());

    if dry_run {
        println!("\n[DRY RUN] Would import {} customers.", requests.len());
        for req in &requests {
            let kw = req
                .proposed_capacity_kw
                .map(|kw| format!("{} kW", kw))
                .unwrap_or_else(|| "-".to_string());
            println!("  {} ({}, {}) {}", req.name, req.phone, req.district, kw);
        }
        return Ok(());
    }

    let mut conn = establish_connection()?;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let mut imported = 0;
        let mut skipped = 0;

        for req in requests {
            let customer = new_customer(req);

            let exists: bool = diesel::select(diesel::dsl::exists(
                customers::table.filter(customers::phone.eq(&customer.phone)),
            ))
            .get_result(conn)?;
            if exists {
                println!("  SKIP {} ({} already registered)", customer.name, customer.phone);
                skipped += 1;
                continue;
            }

            let id: i32 = diesel::insert_into(customers::table)
                .values(&customer)
                .returning(customers::id)
                .get_result(conn)?;

            diesel::insert_into(workflow_events::table)
                .values(&NewWorkflowEvent {
                    customer_id: id,
                    step: WorkflowStep::Registration.number(),
                    changed_by_id: actor_id,
                    comment: Some("Imported from CSV".to_string()),
                })
                .execute(conn)?;

            println!("  IMPORTED {} (id={})", customer.name, id);
            imported += 1;
        }

        println!(
            "\nImport complete: {} imported, {} skipped",
            imported, skipped
        );
        Ok(())
    })?;

    Ok(())
}

fn print_estimate(capacity_kw: &str, panel_type: &str) -> anyhow::Result<()> {
    let panel = parse_panel_type(panel_type)?;
    let Some(est) = estimate_from_input(capacity_kw, panel) else {
        anyhow::bail!("Capacity must be a number above zero, got '{}'", capacity_kw);
    };

    println!("{} kW, {} panels", est.capacity_kw, est.panel_type.as_str());
    println!("{}", "-".repeat(40));
    println!("{:<24} {:>14.0}", "Total cost (Rs)", est.total_cost);
    println!("{:<24} {:>14.0}", "Central subsidy (Rs)", est.subsidy);
    println!("{:<24} {:>14.0}", "Net cost (Rs)", est.net_cost);
    println!(
        "{:<24} {:>14.0}",
        format!("EMI x {} (Rs)", est.loan_term_months),
        est.emi
    );
    println!("{:<24} {:>14.0}", "Units / month", est.monthly_units);
    println!("{:<24} {:>14.0}", "Savings / year (Rs)", est.annual_savings);
    match est.payback_years {
        Some(years) => println!("{:<24} {:>14.1}", "Payback (years)", years),
        None => println!("{:<24} {:>14}", "Payback (years)", "-"),
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn establish_connection() -> anyhow::Result<PgConnection> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    PgConnection::establish(&database_url)
        .with_context(|| format!("Error connecting to {}", database_url))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CreateVendor {
            name,
            phone,
            contact_person,
            email,
            gstin,
            address,
        } => {
            let req = CreateVendor {
                name: name.trim().to_string(),
                contact_person,
                phone,
                email,
                gstin: gstin.map(|g| g.trim().to_uppercase()),
                address,
            };
            req.validate()?;

            let mut conn = establish_connection()?;

            let new_vendor = NewVendor {
                phone: normalize_phone(&req.phone).unwrap_or(req.phone),
                name: req.name.clone(),
                contact_person: req.contact_person,
                email: req.email,
                gstin: req.gstin,
                address: req.address,
            };

            diesel::insert_into(vendors::table)
                .values(&new_vendor)
                .execute(&mut conn)?;

            println!("Created vendor: {}", req.name);
        }

        Commands::ListVendors { include_archived } => {
            let mut conn = establish_connection()?;

            let mut query = vendors::table.order(vendors::name.asc()).into_boxed();
            if !include_archived {
                query = query.filter(vendors::archived.eq(false));
            }
            let results: Vec<Vendor> = query.load(&mut conn)?;

            println!(
                "{:<5} {:<30} {:<12} {:<16} {:<8}",
                "ID", "Name", "Phone", "GSTIN", "Archived"
            );
            println!("{}", "-".repeat(75));
            for vendor in results {
                println!(
                    "{:<5} {:<30} {:<12} {:<16} {:<8}",
                    vendor.id,
                    vendor.name,
                    vendor.phone,
                    vendor.gstin.unwrap_or_default(),
                    if vendor.archived { "yes" } else { "" }
                );
            }
        }

        Commands::CreatePartner {
            code,
            name,
            role,
            phone,
            district,
            parent,
        } => {
            let role = parse_partner_role(&role)?;
            let code = code.trim().to_uppercase();
            if code.is_empty() || code.len() > 20 {
                anyhow::bail!("Code must be 1-20 characters");
            }
            shared::validate::required("name", &name)?;
            shared::validate::phone("phone", &phone)?;

            let mut conn = establish_connection()?;

            let parent_id = match parent {
                Some(parent_code) => {
                    let parent_code = parent_code.trim().to_uppercase();
                    let parent: Partner = partners::table
                        .filter(partners::code.eq(&parent_code))
                        .first(&mut conn)
                        .with_context(|| format!("Parent partner '{}' not found", parent_code))?;
                    Some(parent.id)
                }
                None => None,
            };

            let new_partner = NewPartner {
                code: code.clone(),
                name: name.trim().to_string(),
                role: role.key().to_string(),
                phone: normalize_phone(&phone).unwrap_or(phone),
                district: district.as_deref().and_then(blank_to_none),
                parent_id,
            };

            diesel::insert_into(partners::table)
                .values(&new_partner)
                .execute(&mut conn)?;

            println!("Created {} partner: {} ({})", role.as_str(), new_partner.name, code);
        }

        Commands::ListPartners { role } => {
            let mut conn = establish_connection()?;

            let mut query = partners::table.order(partners::code.asc()).into_boxed();
            if let Some(role) = role {
                query = query.filter(partners::role.eq(parse_partner_role(&role)?.key()));
            }
            let results: Vec<Partner> = query.load(&mut conn)?;

            println!(
                "{:<5} {:<14} {:<30} {:<18} {:<20}",
                "ID", "Code", "Name", "Role", "District"
            );
            println!("{}", "-".repeat(90));
            for partner in results {
                println!(
                    "{:<5} {:<14} {:<30} {:<18} {:<20}",
                    partner.id,
                    partner.code,
                    partner.name,
                    partner.role,
                    partner.district.unwrap_or_default()
                );
            }
        }

        Commands::ListCustomers { district, step } => {
            let mut conn = establish_connection()?;

            let mut query = customers::table
                .order(customers::created_at.desc())
                .select((
                    customers::id,
                    customers::name,
                    customers::phone,
                    customers::district,
                    customers::current_step,
                ))
                .into_boxed();
            if let Some(district) = district {
                query = query.filter(customers::district.ilike(district));
            }
            if let Some(step) = step {
                WorkflowStep::from_number(step)?;
                query = query.filter(customers::current_step.eq(step));
            }
            let results: Vec<(i32, String, String, String, i32)> = query.load(&mut conn)?;

            println!(
                "{:<5} {:<30} {:<12} {:<18} {:<30}",
                "ID", "Name", "Phone", "District", "Step"
            );
            println!("{}", "-".repeat(100));
            for (id, name, phone, district, step) in results {
                let label = WorkflowStep::from_number(step)
                    .map(|s| format!("{}. {}", step, s.as_str()))
                    .unwrap_or_else(|_| format!("{} (unknown)", step));
                println!(
                    "{:<5} {:<30} {:<12} {:<18} {:<30}",
                    id, name, phone, district, label
                );
            }
        }

        Commands::ImportCustomers {
            file,
            actor_id,
            dry_run,
        } => {
            import_customers(file, actor_id, dry_run)?;
        }

        Commands::Estimate {
            capacity_kw,
            panel_type,
        } => {
            print_estimate(&capacity_kw, &panel_type)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> CsvRow {
        CsvRow {
            name: " Asha Patil ".to_string(),
            phone: "+91 98220 12345".to_string(),
            email: String::new(),
            address: "Plot 12, Gangapur Road".to_string(),
            district: "Nashik".to_string(),
            state: "Maharashtra".to_string(),
            consumer_number: "049012345678".to_string(),
            discom: "MSEDCL".to_string(),
            capacity_kw: "3".to_string(),
            panel_type: "Non-DCR".to_string(),
            partner_code: "cp-0042".to_string(),
        }
    }

    #[test]
    fn panel_type_accepts_spreadsheet_labels() {
        assert_eq!(parse_panel_type("DCR").unwrap(), PanelType::Dcr);
        assert_eq!(parse_panel_type("Non-DCR").unwrap(), PanelType::NonDcr);
        assert_eq!(parse_panel_type("non dcr").unwrap(), PanelType::NonDcr);
        assert!(parse_panel_type("mono").is_err());
    }

    #[test]
    fn partner_roles_use_stored_keys() {
        assert_eq!(parse_partner_role("BDP").unwrap(), PartnerRole::Bdp);
        assert!(parse_partner_role("agent").is_err());
    }

    #[test]
    fn csv_row_becomes_a_registered_customer() {
        let customer = new_customer(row().to_request().unwrap());
        assert_eq!(customer.name, "Asha Patil");
        assert_eq!(customer.phone, "9822012345");
        assert_eq!(customer.email, None);
        assert_eq!(customer.panel_type.as_deref(), Some("non_dcr"));
        assert_eq!(customer.partner_code.as_deref(), Some("CP-0042"));
        assert_eq!(customer.current_step, 1);
    }

    #[test]
    fn csv_row_errors_name_the_problem() {
        let mut bad = row();
        bad.capacity_kw = "three".to_string();
        assert!(bad.to_request().unwrap_err().to_string().contains("three"));

        let mut bad = row();
        bad.phone = "12345".to_string();
        assert!(bad.to_request().unwrap_err().to_string().starts_with("phone"));
    }

    #[test]
    fn estimate_rejects_bad_capacity() {
        assert!(print_estimate("0", "dcr").is_err());
        assert!(print_estimate("2", "dcr").is_ok());
    }
}
