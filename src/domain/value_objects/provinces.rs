/// Maps an Indian state name to the two-letter province code the storefront
/// expects in address payloads. Unknown states fall back to the first two
/// characters uppercased.
pub fn province_code(state: &str) -> String {
    let code = match state {
        "Gujarat" => "GJ",
        "Maharashtra" => "MH",
        "Karnataka" => "KA",
        "Tamil Nadu" => "TN",
        "Delhi" => "DL",
        "Uttar Pradesh" => "UP",
        "West Bengal" => "WB",
        "Rajasthan" => "RJ",
        "Kerala" => "KL",
        "Andhra Pradesh" => "AP",
        "Telangana" => "TS",
        "Haryana" => "HR",
        "Punjab" => "PB",
        "Odisha" => "OR",
        "Madhya Pradesh" => "MP",
        "Bihar" => "BR",
        "Jharkhand" => "JH",
        "Assam" => "AS",
        _ => return state.chars().take(2).collect::<String>().to_uppercase(),
    };
    code.to_string()
}
