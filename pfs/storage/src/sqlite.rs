pub(crate) const DB_CREATE_SETTINGS: &str = "
CREATE TABLE IF NOT EXISTS settings (
	name VARCHAR[24] NOT NULL PRIMARY KEY,
	value TEXT
);
";

pub(crate) const DB_CREATE_CHANNEL_FEE_RATES: &str = "
CREATE TABLE IF NOT EXISTS channel_fee_rates (
	channel_id TEXT NOT NULL,
	participant TEXT NOT NULL,
	policy TEXT NOT NULL,
	PRIMARY KEY (channel_id, participant)
);
";
