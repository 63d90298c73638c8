//! Registration and validation walkthrough

use fieldrules::{record_field, register, Record, Schema, Validator, ValidatorConfig};

#[derive(Debug, Default)]
struct Address {
    city: String,
    zip: String,
}

impl Record for Address {
    fn describe(schema: &mut Schema<Self>) {
        schema
            .field("City", "req", |a| &a.city)
            .field("Zip", "req|regex:^[0-9]{5}$", |a| &a.zip);
    }
}

record_field!(Address);

#[derive(Debug, Default)]
struct User {
    name: String,
    age: u8,
    role: String,
    nickname: Option<String>,
    tags: Vec<String>,
    address: Option<Address>,
}

impl Record for User {
    fn describe(schema: &mut Schema<Self>) {
        schema
            .field("Name", "req|min:5|max:15|alpha", |u| &u.name)
            .field("Age", "min:3|max:120", |u| &u.age)
            .field("Role", "in:admin,user,editor", |u| &u.role)
            .field("Nickname", "min:2", |u| &u.nickname)
            .field("Tags", "max:5|dive|req|max:10", |u| &u.tags)
            .field("Address", "dive", |u| &u.address);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("fieldrules=debug").init();

    println!("fieldrules demo");
    println!("===============\n");

    let config = ValidatorConfig::builder().strict().build_config();
    let mut validator = Validator::with_config(config);
    validator.add_text_rule("alpha", |field, text| {
        (!text.chars().all(char::is_alphabetic)).then(|| format!("{field} can only contain letters"))
    })?;
    register!(validator, User, Address)?;
    validator.add_record_rule(|user: &User| {
        Ok((user.role == "admin" && user.age < 18).then(|| "admins must be adults".to_string()))
    })?;

    let user = User {
        name: "Gopher".to_string(),
        age: 30,
        role: "admin".to_string(),
        nickname: Some("go".to_string()),
        tags: vec!["rust".to_string(), "go".to_string()],
        address: Some(Address {
            city: "Berlin".to_string(),
            zip: "10115".to_string(),
        }),
    };
    println!("Valid user: {:?}\n", validator.violation(&user)?);

    let user = User {
        name: "G0".to_string(),
        age: 12,
        role: "admin".to_string(),
        nickname: Some(String::new()),
        tags: vec!["rust".to_string(), String::new()],
        address: Some(Address {
            city: String::new(),
            zip: "abc".to_string(),
        }),
    };

    if let Some(violation) = validator.violation(&user)? {
        println!("First violation: {violation}\n");
    }

    let violations = validator.violations(&user)?;
    println!("{violations}\n");
    println!("{}", serde_json::to_string_pretty(&violations.to_json())?);

    Ok(())
}
