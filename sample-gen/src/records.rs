/// Amount printed on every sample invoice.
pub const AMOUNT: &str = "500.00";

/// One mock invoice: the data behind a single sample document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceRecord {
    pub id: &'static str,
    pub name: &'static str,
    /// Only used by the upload manifest; never drawn on the page.
    pub phone: &'static str,
}

/// The fixed records, in generation order.
pub const SAMPLE_RECORDS: [InvoiceRecord; 5] = [
    InvoiceRecord { id: "INV-001", name: "John Mensah", phone: "233244123456" },
    InvoiceRecord { id: "INV-002", name: "Grace Adu", phone: "233201234567" },
    InvoiceRecord { id: "INV-003", name: "Kwame Osei", phone: "233551234567" },
    InvoiceRecord { id: "INV-004", name: "Ama Asante", phone: "233209876543" },
    InvoiceRecord { id: "INV-005", name: "Kofi Boateng", phone: "233245678901" },
];

impl InvoiceRecord {
    /// The three lines drawn on the page.
    pub fn payload_lines(&self) -> [String; 3] {
        [
            format!("Invoice: {}", self.id),
            format!("Customer: {}", self.name),
            format!("Amount: {}", AMOUNT),
        ]
    }

    pub fn payload(&self) -> String {
        self.payload_lines().join("\n")
    }

    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn payload_for_first_record() {
        assert_eq!(
            SAMPLE_RECORDS[0].payload(),
            "Invoice: INV-001\nCustomer: John Mensah\nAmount: 500.00"
        );
    }

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = SAMPLE_RECORDS.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), SAMPLE_RECORDS.len());
    }

    #[test]
    fn file_name_uses_id() {
        assert_eq!(SAMPLE_RECORDS[4].file_name(), "INV-005.pdf");
    }

    #[test]
    fn payload_leaves_out_phone() {
        let record = SAMPLE_RECORDS[1];
        assert_eq!(record.phone, "233201234567");
        assert!(!record.payload().contains(record.phone));
    }
}
