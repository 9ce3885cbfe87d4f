//! List recognised website types.

use sitesmith_template::WebsiteType;

/// Run the types command.
pub fn run() {
    for website_type in WebsiteType::ALL {
        println!("{}", website_type);
    }
}
