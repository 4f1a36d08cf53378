//! Test fixtures shared across the bulletin parser test modules

mod structured_tests;

/// A structured bulletin with a `**METADATA**` block, one duplicated row,
/// and a full issuing-office header.
pub fn structured_bulletin() -> String {
    "\
NOUS41 KOKX 250203
PNSOKX
CTZ005>012-NJZ010>015-032130-

Public Information Statement
National Weather Service
New York NY
831 AM EST Mon Feb 3 2025

...SNOWFALL REPORTS...

**METADATA**
:1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall
:1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall
:1/19/2025,945 PM, CT, New Haven, Milford, , , 41.22, -73.06, SNOW_24, 2.5, Inch, Trained Spotter, 24 hour snowfall
"
    .to_string()
}

/// An alternative-format bulletin with a whitespace-aligned table, a county
/// separator, and a short (skippable) row.
pub fn alternative_bulletin() -> String {
    "\
NOUS41 KBOX 250119
PNSBOX

Public Information Statement
National Weather Service
Boston/Norton MA
1000 PM EST Sun Jan 19 2025

...Storm Total Snowfall...

Location          Temp        Amount
...Fairfield County...
Stamford, CT       32F         3.5 in
Norwalk, CT        31F         2.8 in
Bridgeport         30F
"
    .to_string()
}

/// Prose-only text with no structural anchor in either layout
pub fn anchorless_bulletin() -> String {
    "\
Public Information Statement
National Weather Service
Spotter reports will be summarized in a later statement.
"
    .to_string()
}

pub fn as_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}
