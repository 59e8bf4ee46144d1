//! Prompt body text for each recognized document type.
//!
//! These are natural-language instructions handed to the completion backend;
//! they encode the extraction heuristics for withholding-document images but
//! carry no executable logic. Bodies are selected by
//! [`PromptKind`](super::PromptKind) and substituted into an outer template.

/// Withholding statement: main information block plus the entity table.
pub(crate) const TYPE1: &str = r#"
Read the scanned withholding statement, correcting for any flipped or skewed
page orientation. The general information is found in the top rows or the
first table; the tables that follow hold one entity per row.
Extraction notes:
    - EntityType: prefer the code over the descriptive string. If there is no
      "Entity Type" column, take it from a column whose lower-cased name
      contains "chapter 3" or "type of recipient".
    - City, State, Country and ZipCode may need to be split out of a single
      address line. Do not misclassify between them.
    - EIN: if absent, fall back to the USTIN or TIN column.
    - ForeignTaxpayerId: if absent, fall back to FTIN or ForeignTIN.
    - AllocationPercentage: a column whose lower-cased name contains
      "allocation". If there is exactly one entity, its value is 100.00%.
If a column name bundles several components (for example "Entity Type,
Resident Country, Type of Document"), split the cell value by the order the
components appear in the name.
Report a field as None when its value is not present in the image; never
infer it from other fields. Use only English/alphabetic characters.
"#;

/// Tier classification: decide one-tier versus multi-tier.
pub(crate) const TYPE2: &str = r#"
Read the scanned document, correcting for any flipped or skewed page
orientation. Entities may be ranked in tiers (tier 1 above tier 2 above
tier 3, and so on). Decide whether the document is "One tier" or
"Multi tier":
    - Indentation in the Name / InvestorName column implies tier: a deeper
      indent than the previous row means a lower tier.
    - A Tier 1 / Tier 2 / Tier 3 column assigns the tier of each entity by
      which column its name sits in.
    - HEADING lines reading "Tier 1" / "Tier 2" split the page into per-tier
      tables; rows between "Tier 1" and "Tier 2" belong to tier 1.
    - If a run of consecutive entities has allocation percentages summing to
      100%, their tier is one below the closest preceding entity.
If the text contains "with <number> tiers" and the number is greater than 1,
the answer is "Multi tier". Also report the detection method:
"tier-by-location" when tiers come from table layout, otherwise
"tier-not-by-location".
"#;

/// Tier detection: list every entity with its tier number.
pub(crate) const TYPE3: &str = r#"
Read the scanned document, correcting for any flipped or skewed page
orientation. List every entity name together with its tier number, using
these rules in order of preference:
    1. Indentation level in the Name / InvestorName column: equal indent
       means equal tier, deeper indent means a lower tier.
    2. Sub-columns inside the Name column: the 1st sub-column is tier 1, the
       2nd is tier 2, and so on left to right.
    3. An explicit Tier 1 / Tier 2 / Tier 3 column.
    4. HEADING lines reading "Tier 1" / "Tier 2": rows between two headings
       belong to the earlier heading's tier.
Where a run of consecutive entities has allocation percentages summing to
100%, place them one tier below the closest preceding entity. Ignore names
that only appear inside parentheses within another entity's name.
Report a field as None when its value is not present in the image.
"#;

/// Parent linkage: attach each entity to its parent by tier.
pub(crate) const TYPE4: &str = r#"
Read the scanned document, correcting for any flipped or skewed page
orientation. For every entity, report its ParentName: the closest preceding
entity one tier higher. Tier-1 entities take the main information Name as
their parent. Determine tiers from indentation, Name sub-columns, explicit
Tier columns, or "Tier N" HEADING lines, in that order of preference. Where
a run of consecutive entities has allocation percentages summing to 100%,
their parent is the closest preceding entity of a higher tier. If no tier
structure is detectable at all, every entity's parent is the main
information Name. An entity of a higher tier may have several children.
"#;

/// Allocation schedule: per-entity allocation and ownership percentages.
pub(crate) const TYPE5: &str = r#"
Read the scanned allocation schedule, correcting for any flipped or skewed
page orientation. For each entity report AllocationPercentage (a column
whose lower-cased name contains "allocation") and TierOwnershipPercentage
(a column whose lower-cased name contains "ownership percentage" or
"ownership %"). When the schedule has per-tier columns (Tier 1 / Tier 2 /
Tier 3), pair each entity with the percentage from its own tier's column.
If there is exactly one entity, its allocation is 100.00%. Keep percentage
values exactly as printed, including the percent sign.
"#;

/// Form inventory: document types and account numbers per entity.
pub(crate) const TYPE6: &str = r#"
Read the scanned transmittal page, correcting for any flipped or skewed page
orientation. For each row report the account Number, the entity Name, and
the FormType. FormType is interchangeable with "DocumentType" or "Type of
Document" column headings. Number is interchangeable with AccountNumber.
Report a field as None when its value is not present in the image; never
infer it from another row.
"#;

/// Address block extraction.
pub(crate) const TYPE7: &str = r#"
Read the scanned document, correcting for any flipped or skewed page
orientation. Extract the full mailing address of each entity as
AddressLine1..3, City_Town, State, Country and ZipCode. Addresses are often
printed as a single block; split carefully and do not misclassify City,
State, Country or ZipCode between each other. Report a field as None when
its value is not present in the image.
"#;

/// Status and certification block.
pub(crate) const TYPE8: &str = r#"
Read the scanned certification page, correcting for any flipped or skewed
page orientation. For each entity report Chapter4Status (a column whose
lower-cased name contains "chapter 4" or "fatca status"; take the first
such column and prefer the code over the string), GIIN, and the
certification Date. Report a field as None when its value is not present in
the image; never infer it from other fields.
"#;

/// Default body used when the document type is unrecognized.
pub(crate) const NO_TYPE: &str = r#"
Read the scanned document, correcting for any flipped or skewed page
orientation. Extract the general information from the top rows or first
table, then every entity row from the tables that follow, keeping the
printed column headings as field names. Report a field as None when its
value is not present in the image; never infer it from other fields. Use
only English/alphabetic characters.
"#;
